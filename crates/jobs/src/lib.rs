pub mod backup_retention;
pub mod runner;

pub use backup_retention::BackupRetentionJob;
pub use runner::JobRunner;
