use crate::ports::{BackupCatalog, MetricsSink};
use crate::services::{Evaluation, RetentionEvaluator};
use crate::use_cases::retention::DeleteExcessBackupsUseCase;
use backup_pruner_domain::{DeletionReport, DomainError, RetentionPolicy, RetentionProfile};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// What one cycle observed and did for a profile.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub profile: String,
    pub retained_before: usize,
    pub excess: usize,
    pub deletions: DeletionReport,
    /// Evaluation that was published: the re-evaluated one when deletions ran.
    pub evaluation: Evaluation,
}

/// Fetch, evaluate, delete the overflow, re-fetch, publish.
///
/// Deletion runs at most once per cycle. A profile still over its cap after
/// that is handled by the next cycle.
pub struct RunRetentionCycleUseCase {
    catalog: Arc<dyn BackupCatalog>,
    delete_excess: Arc<DeleteExcessBackupsUseCase>,
    metrics: Arc<dyn MetricsSink>,
}

impl RunRetentionCycleUseCase {
    pub fn new(
        catalog: Arc<dyn BackupCatalog>,
        delete_excess: Arc<DeleteExcessBackupsUseCase>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            catalog,
            delete_excess,
            metrics,
        }
    }

    pub async fn execute(
        &self,
        profile: &RetentionProfile,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, DomainError> {
        self.execute_at(profile, Utc::now(), cancel).await
    }

    /// The snapshot is published only when the whole cycle succeeds; deletion
    /// outcomes are recorded as they happen.
    pub async fn execute_at(
        &self,
        profile: &RetentionProfile,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, DomainError> {
        match self.run(profile, now, cancel).await {
            Ok(report) => {
                self.metrics
                    .publish_snapshot(profile.name(), &report.evaluation.snapshot());
                Ok(report)
            }
            Err(e) => {
                self.metrics.record_cycle_failure(profile.name());
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        profile: &RetentionProfile,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, DomainError> {
        let policy = &profile.policy;
        info!(
            profile = %policy.profile_name,
            max_count = %policy.max_count,
            max_age = %policy.max_age,
            "Evaluating backups"
        );

        let evaluation = self.fetch_and_evaluate(policy, now).await?;
        let retained_before = evaluation.kept.len();
        let excess = evaluation.excess(policy);

        if excess == 0 {
            info!(
                profile = %policy.profile_name,
                retained = retained_before,
                limit = %policy.max_count,
                "No backups deleted"
            );
            return Ok(CycleReport {
                profile: policy.profile_name.clone(),
                retained_before,
                excess,
                deletions: DeletionReport::default(),
                evaluation,
            });
        }

        let metrics = &self.metrics;
        let deletions = self
            .delete_excess
            .execute_with(&evaluation.kept, excess, &profile.target, cancel, |outcome| {
                metrics.record_deletion(profile.name(), outcome.status)
            })
            .await?;

        let evaluation = self.fetch_and_evaluate(policy, now).await?;
        info!(
            profile = %policy.profile_name,
            deleted = deletions.completed(),
            failed = deletions.failed(),
            retained = evaluation.kept.len(),
            "Backup evaluation complete"
        );

        Ok(CycleReport {
            profile: policy.profile_name.clone(),
            retained_before,
            excess,
            deletions,
            evaluation,
        })
    }

    async fn fetch_and_evaluate(
        &self,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, DomainError> {
        let records = self.catalog.list_backups().await?;
        info!(
            profile = %policy.profile_name,
            records = records.len(),
            "Backup records fetched"
        );
        Ok(RetentionEvaluator::evaluate(&records, policy, now))
    }
}
