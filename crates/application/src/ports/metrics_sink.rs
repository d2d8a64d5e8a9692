use backup_pruner_domain::{DeletionStatus, StatusCounts};

/// Point-in-time view of one profile after evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionSnapshot {
    pub counts: StatusCounts,
    pub retained: usize,
    /// Unix seconds, 0 when nothing is retained.
    pub oldest_retained: i64,
    /// Unix seconds, 0 when nothing is retained.
    pub newest_retained: i64,
}

/// Destination of per-profile retention metrics. Implementations must accept
/// concurrent writes for different profiles.
pub trait MetricsSink: Send + Sync {
    fn publish_snapshot(&self, profile: &str, snapshot: &RetentionSnapshot);

    fn record_deletion(&self, profile: &str, status: DeletionStatus);

    fn record_cycle_failure(&self, profile: &str);
}
