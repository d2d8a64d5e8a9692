use thiserror::Error;

/// Errors that abort an evaluation cycle.
///
/// A deletion job that reaches the `failed` state is not an error: it is
/// reported as a per-record outcome and the cycle moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Backup catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Failed to remove backup {backup} from catalog: {reason}")]
    CatalogDeleteFailed { backup: String, reason: String },

    #[error("Deletion executor failed: {0}")]
    ExecutorFailed(String),

    #[error("Unexpected deletion executor output: {0:?}")]
    UnexpectedExecutorOutput(String),

    #[error("Status of deletion job {job} unavailable: {reason}")]
    JobStatusUnavailable { job: String, reason: String },

    #[error("Deletion job {job} did not finish within {waited_secs}s")]
    DeletionTimedOut { job: String, waited_secs: u64 },

    #[error("Evaluation cycle cancelled")]
    Cancelled,

    #[error("Invalid retention policy: {0}")]
    InvalidPolicy(String),
}
