mod backup_catalog;
mod deletion_executor;
mod deletion_job_status;
mod metrics_sink;

pub use backup_catalog::BackupCatalog;
pub use deletion_executor::DeletionExecutor;
pub use deletion_job_status::DeletionJobStatus;
pub use metrics_sink::{MetricsSink, RetentionSnapshot};
