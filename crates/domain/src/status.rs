use crate::backup::BackupStatus;
use std::fmt;

const BUCKET_COUNT: usize = 7;

/// Observability bucket of a backup status. `failed` and `attemptfailed`
/// share the `Failed` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBucket {
    Complete,
    Pending,
    Running,
    Failed,
    Skipped,
    Deleting,
    Unknown,
}

impl StatusBucket {
    pub const ALL: [StatusBucket; BUCKET_COUNT] = [
        StatusBucket::Complete,
        StatusBucket::Pending,
        StatusBucket::Running,
        StatusBucket::Failed,
        StatusBucket::Skipped,
        StatusBucket::Deleting,
        StatusBucket::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Deleting => "deleting",
            Self::Unknown => "unknown",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl From<BackupStatus> for StatusBucket {
    fn from(status: BackupStatus) -> Self {
        match status {
            BackupStatus::Complete => Self::Complete,
            BackupStatus::Pending => Self::Pending,
            BackupStatus::Running => Self::Running,
            BackupStatus::Failed | BackupStatus::AttemptFailed => Self::Failed,
            BackupStatus::Skipped => Self::Skipped,
            BackupStatus::Deleting => Self::Deleting,
            BackupStatus::Unknown => Self::Unknown,
        }
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of backups per status bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    counts: [u64; BUCKET_COUNT],
}

impl StatusCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, bucket: StatusBucket) {
        self.counts[bucket.index()] += 1;
    }

    pub fn record(&mut self, status: BackupStatus) {
        self.increment(StatusBucket::from(status));
    }

    pub fn get(&self, bucket: StatusBucket) -> u64 {
        self.counts[bucket.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Every bucket, zeros included, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (StatusBucket, u64)> + '_ {
        StatusBucket::ALL.iter().map(move |b| (*b, self.get(*b)))
    }
}
