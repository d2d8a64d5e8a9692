use backup_pruner_domain::{BackupRecord, RetentionPolicy, StatusCounts};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ports::RetentionSnapshot;

/// Result of classifying one profile's records against its policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Complete backups inside the age window, oldest first.
    pub kept: Vec<BackupRecord>,
    /// Status buckets: every non-complete record, plus the profile's complete ones.
    pub counts: StatusCounts,
    /// Complete backups of the profile older than the age window.
    pub expired: usize,
}

impl Evaluation {
    /// Number of kept backups over the policy's count cap.
    pub fn excess(&self, policy: &RetentionPolicy) -> usize {
        policy.max_count.excess(self.kept.len())
    }

    pub fn snapshot(&self) -> RetentionSnapshot {
        RetentionSnapshot {
            counts: self.counts,
            retained: self.kept.len(),
            oldest_retained: self.kept.first().map(BackupRecord::created_at_unix).unwrap_or(0),
            newest_retained: self.kept.last().map(BackupRecord::created_at_unix).unwrap_or(0),
        }
    }
}

/// Classifies backup records into kept and expired sets.
pub struct RetentionEvaluator;

impl RetentionEvaluator {
    /// Every non-complete record lands in its status bucket whatever its
    /// profile. Complete records of other profiles are ignored; the policy's
    /// own are kept only when created strictly after the age cutoff.
    pub fn evaluate(
        records: &[BackupRecord],
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Evaluation {
        let cutoff = policy.max_age.cutoff(now);
        let mut evaluation = Evaluation::default();

        for record in records {
            if !record.is_complete() {
                evaluation.counts.record(record.status);
                continue;
            }
            if record.profile != policy.profile_name {
                continue;
            }
            evaluation.counts.record(record.status);

            let within_window = match cutoff {
                Some(cutoff) => record.created_at.is_some_and(|t| t > cutoff),
                None => true,
            };
            if within_window {
                evaluation.kept.push(record.clone());
            } else {
                evaluation.expired += 1;
            }
        }

        evaluation.kept.sort_by_key(|r| r.created_at);

        debug!(
            profile = %policy.profile_name,
            kept = evaluation.kept.len(),
            expired = evaluation.expired,
            total = evaluation.counts.total(),
            "Backups categorised"
        );

        evaluation
    }

    /// Evaluates several independent windows over the same record set.
    pub fn evaluate_windows(
        records: &[BackupRecord],
        policies: &[RetentionPolicy],
        now: DateTime<Utc>,
    ) -> Vec<Evaluation> {
        policies
            .iter()
            .map(|policy| Self::evaluate(records, policy, now))
            .collect()
    }
}
