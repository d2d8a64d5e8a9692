pub mod retention;

// Re-export use cases
pub use retention::{CycleReport, DeleteExcessBackupsUseCase, RunRetentionCycleUseCase};
