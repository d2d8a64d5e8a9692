use async_trait::async_trait;
use backup_pruner_domain::{BackupStatus, DeletionJobId, DomainError};

#[async_trait]
pub trait DeletionJobStatus: Send + Sync {
    async fn job_status(&self, job: &DeletionJobId) -> Result<BackupStatus, DomainError>;
}
