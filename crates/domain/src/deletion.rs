use crate::errors::DomainError;
use std::fmt;

const EXECUTOR_PREFIX: &str = "actionset ";
const EXECUTOR_SUFFIX: &str = " created";

/// Name of the asynchronous job created by the deletion executor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeletionJobId(String);

impl DeletionJobId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Extracts the job name from executor output of the exact shape
    /// `actionset <name> created`.
    pub fn from_executor_output(output: &str) -> Result<Self, DomainError> {
        let trimmed = output.trim();
        let name = trimmed
            .strip_prefix(EXECUTOR_PREFIX)
            .and_then(|rest| rest.strip_suffix(EXECUTOR_SUFFIX))
            .map(str::trim)
            .filter(|name| !name.is_empty() && !name.contains(char::is_whitespace))
            .ok_or_else(|| DomainError::UnexpectedExecutorOutput(trimmed.to_string()))?;

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeletionJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionStatus {
    Completed,
    Failed,
}

impl DeletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Result of deleting one backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub backup_id: String,
    pub job_id: DeletionJobId,
    pub status: DeletionStatus,
}

/// Outcomes of one orchestrator run, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub outcomes: Vec<DeletionOutcome>,
}

impl DeletionReport {
    pub fn completed(&self) -> usize {
        self.count(DeletionStatus::Completed)
    }

    pub fn failed(&self) -> usize {
        self.count(DeletionStatus::Failed)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, status: DeletionStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}
