use chrono::{DateTime, Utc};
use std::fmt;

/// Profile assigned to records that carry no schedule tag.
pub const NO_PROFILE: &str = "none";

/// State reported by the backup catalog for a backup or deletion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackupStatus {
    Pending,
    Running,
    Complete,
    Failed,
    AttemptFailed,
    Skipped,
    Deleting,
    Unknown,
}

impl BackupStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "complete" => Self::Complete,
            "failed" => Self::Failed,
            "attemptfailed" => Self::AttemptFailed,
            "skipped" => Self::Skipped,
            "deleting" => Self::Deleting,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::AttemptFailed => "attemptfailed",
            Self::Skipped => "skipped",
            Self::Deleting => "deleting",
            Self::Unknown => "unknown",
        }
    }

    /// A deletion job is finished once it is `complete` or `failed`.
    /// `attemptfailed` means the executor is still retrying.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized, read-only snapshot of one backup catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub identifier: String,
    /// `None` when the catalog had no parseable creation timestamp; such
    /// records order before every dated record.
    pub created_at: Option<DateTime<Utc>>,
    pub status: BackupStatus,
    pub profile: String,
}

impl BackupRecord {
    pub fn new(
        identifier: impl Into<String>,
        created_at: Option<DateTime<Utc>>,
        status: BackupStatus,
        profile: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            created_at,
            status,
            profile: profile.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == BackupStatus::Complete
    }

    /// Unix seconds of the creation time, 0 when unknown.
    pub fn created_at_unix(&self) -> i64 {
        self.created_at.map(|t| t.timestamp()).unwrap_or(0)
    }
}
