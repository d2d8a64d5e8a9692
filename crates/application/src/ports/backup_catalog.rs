use async_trait::async_trait;
use backup_pruner_domain::{BackupRecord, DomainError};

/// Read/delete access to the catalog of backup records.
#[async_trait]
pub trait BackupCatalog: Send + Sync {
    /// All backup records currently listed, already normalized. Entries that
    /// are not backups are left out.
    async fn list_backups(&self) -> Result<Vec<BackupRecord>, DomainError>;

    /// Removes a record once its data has been deleted.
    async fn delete_backup(&self, identifier: &str) -> Result<(), DomainError>;
}
