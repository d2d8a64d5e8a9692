pub mod delete_excess_backups;
pub mod run_retention_cycle;

pub use delete_excess_backups::DeleteExcessBackupsUseCase;
pub use run_retention_cycle::{CycleReport, RunRetentionCycleUseCase};
