//! backup-pruner domain layer
pub mod backup;
pub mod config;
pub mod deletion;
pub mod errors;
pub mod retention;
pub mod status;

pub use backup::{BackupRecord, BackupStatus, NO_PROFILE};
pub use config::{CliOverrides, Config, ConfigError};
pub use deletion::{DeletionJobId, DeletionOutcome, DeletionReport, DeletionStatus};
pub use errors::DomainError;
pub use retention::{CountCap, DeletionTarget, RetentionAge, RetentionPolicy, RetentionProfile};
pub use status::{StatusBucket, StatusCounts};
