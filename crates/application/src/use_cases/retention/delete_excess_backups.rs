use crate::ports::{BackupCatalog, DeletionExecutor, DeletionJobStatus};
use backup_pruner_domain::{
    BackupRecord, BackupStatus, DeletionJobId, DeletionOutcome, DeletionReport, DeletionStatus,
    DeletionTarget, DomainError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Deletes the oldest retained backups, one at a time.
///
/// Each deletion is submitted, then its job is polled until it reaches a
/// terminal state before the next one starts. Only a completed job removes
/// the backup from the catalog.
pub struct DeleteExcessBackupsUseCase {
    executor: Arc<dyn DeletionExecutor>,
    job_status: Arc<dyn DeletionJobStatus>,
    catalog: Arc<dyn BackupCatalog>,
    poll_interval: Duration,
    poll_timeout: Option<Duration>,
}

impl DeleteExcessBackupsUseCase {
    pub fn new(
        executor: Arc<dyn DeletionExecutor>,
        job_status: Arc<dyn DeletionJobStatus>,
        catalog: Arc<dyn BackupCatalog>,
    ) -> Self {
        Self {
            executor,
            job_status,
            catalog,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Abort the cycle when a single job takes longer than `timeout`.
    pub fn with_poll_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// `kept` must be ordered oldest first; the first `excess` entries are
    /// deleted in that order.
    pub async fn execute(
        &self,
        kept: &[BackupRecord],
        excess: usize,
        target: &DeletionTarget,
        cancel: &CancellationToken,
    ) -> Result<DeletionReport, DomainError> {
        self.execute_with(kept, excess, target, cancel, |_| {}).await
    }

    /// Like [`execute`](Self::execute), calling `on_outcome` as soon as each
    /// job finishes. Outcomes reported before an error are not rolled back.
    pub async fn execute_with(
        &self,
        kept: &[BackupRecord],
        excess: usize,
        target: &DeletionTarget,
        cancel: &CancellationToken,
        mut on_outcome: impl FnMut(&DeletionOutcome) + Send,
    ) -> Result<DeletionReport, DomainError> {
        let candidates = &kept[..excess.min(kept.len())];
        let total = candidates.len();
        let mut report = DeletionReport::default();

        for (position, backup) in candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(DomainError::Cancelled);
            }

            info!(
                backup = %backup.identifier,
                created_at = ?backup.created_at,
                deletion = position + 1,
                total,
                retained = kept.len(),
                "Deleting backup"
            );

            let output = self
                .executor
                .submit_deletion(&backup.identifier, target)
                .await?;
            let job = DeletionJobId::from_executor_output(&output).inspect_err(|e| {
                error!(backup = %backup.identifier, error = %e, "Deletion was not accepted");
            })?;

            let status = match self.wait_for_job(&job, cancel).await? {
                BackupStatus::Complete => {
                    self.catalog.delete_backup(&backup.identifier).await?;
                    info!(backup = %backup.identifier, job = %job, "Backup deleted");
                    DeletionStatus::Completed
                }
                state => {
                    warn!(
                        backup = %backup.identifier,
                        job = %job,
                        state = %state,
                        "Deletion job failed, backup kept in catalog"
                    );
                    DeletionStatus::Failed
                }
            };

            let outcome = DeletionOutcome {
                backup_id: backup.identifier.clone(),
                job_id: job,
                status,
            };
            on_outcome(&outcome);
            report.outcomes.push(outcome);
        }

        Ok(report)
    }

    async fn wait_for_job(
        &self,
        job: &DeletionJobId,
        cancel: &CancellationToken,
    ) -> Result<BackupStatus, DomainError> {
        let started = Instant::now();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(DomainError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            let state = self.job_status.job_status(job).await?;
            if state.is_terminal() {
                return Ok(state);
            }
            debug!(job = %job, state = %state, "Waiting for deletion job");

            if let Some(timeout) = self.poll_timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(DomainError::DeletionTimedOut {
                        job: job.to_string(),
                        waited_secs: waited.as_secs(),
                    });
                }
            }
        }
    }
}
