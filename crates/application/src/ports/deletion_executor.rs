use async_trait::async_trait;
use backup_pruner_domain::{DeletionTarget, DomainError};

/// External tool that starts an asynchronous deletion job for a backup.
#[async_trait]
pub trait DeletionExecutor: Send + Sync {
    /// Submits the deletion and returns the tool's raw output, which names
    /// the created job.
    async fn submit_deletion(
        &self,
        backup_id: &str,
        target: &DeletionTarget,
    ) -> Result<String, DomainError>;
}
