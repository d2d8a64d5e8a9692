use backup_pruner_application::use_cases::{CycleReport, RunRetentionCycleUseCase};
use backup_pruner_domain::{DomainError, RetentionProfile};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Runs one evaluation cycle per profile on every tick. Profiles of a tick
/// run concurrently; a failing profile does not affect the others.
pub struct BackupRetentionJob {
    cycle: Arc<RunRetentionCycleUseCase>,
    profiles: Vec<RetentionProfile>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl BackupRetentionJob {
    pub fn new(cycle: Arc<RunRetentionCycleUseCase>, profiles: Vec<RetentionProfile>) -> Self {
        Self {
            cycle,
            profiles,
            interval_secs: DEFAULT_INTERVAL_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// One cycle for every profile; results follow the profile order.
    pub async fn run_once(&self) -> Vec<Result<CycleReport, DomainError>> {
        let results = join_all(
            self.profiles
                .iter()
                .map(|profile| self.cycle.execute(profile, &self.shutdown)),
        )
        .await;

        for (profile, result) in self.profiles.iter().zip(&results) {
            match result {
                Ok(report) => info!(
                    profile = %profile.name(),
                    retained = report.evaluation.kept.len(),
                    excess = report.excess,
                    deleted = report.deletions.completed(),
                    failed = report.deletions.failed(),
                    "Retention cycle completed"
                ),
                Err(DomainError::Cancelled) => {
                    warn!(profile = %profile.name(), "Retention cycle cancelled")
                }
                Err(e) => error!(profile = %profile.name(), error = %e, "Retention cycle failed"),
            }
        }

        results
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            profiles = self.profiles.len(),
            interval_secs = self.interval_secs,
            "Starting backup retention job"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("BackupRetentionJob: shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.run_once().await;
                }
            }
        }
    }
}
