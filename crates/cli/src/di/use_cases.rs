use super::Adapters;
use backup_pruner_application::use_cases::{DeleteExcessBackupsUseCase, RunRetentionCycleUseCase};
use backup_pruner_domain::{Config, RetentionProfile};
use backup_pruner_jobs::BackupRetentionJob;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Evaluation cycles grouped by the namespace their profiles live in.
pub struct Services {
    groups: Vec<(Arc<RunRetentionCycleUseCase>, Vec<RetentionProfile>)>,
}

impl Services {
    pub fn new(config: &Config, profiles: Vec<RetentionProfile>) -> anyhow::Result<Self> {
        let mut by_namespace: BTreeMap<String, Vec<RetentionProfile>> = BTreeMap::new();
        for profile in profiles {
            by_namespace
                .entry(profile.target.namespace.clone())
                .or_default()
                .push(profile);
        }

        let adapters = Adapters::new(config, by_namespace.keys().map(String::as_str))?;

        let mut groups = Vec::with_capacity(by_namespace.len());
        for (namespace, profiles) in by_namespace {
            let catalog = adapters
                .catalogs
                .get(&namespace)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("No Kubernetes client for namespace {}", namespace))?;

            let delete_excess = DeleteExcessBackupsUseCase::new(
                adapters.executor.clone(),
                catalog.clone(),
                catalog.clone(),
            )
            .with_poll_interval(config.kanister.poll_interval())
            .with_poll_timeout(config.kanister.poll_timeout());

            let cycle = Arc::new(RunRetentionCycleUseCase::new(
                catalog,
                Arc::new(delete_excess),
                adapters.metrics.clone(),
            ));
            groups.push((cycle, profiles));
        }

        Ok(Self { groups })
    }

    pub fn into_jobs(self, interval_secs: u64) -> Vec<BackupRetentionJob> {
        self.groups
            .into_iter()
            .map(|(cycle, profiles)| {
                BackupRetentionJob::new(cycle, profiles).with_interval(interval_secs)
            })
            .collect()
    }

    /// Runs every profile once and returns the number of failed cycles.
    pub async fn run_once(&self) -> usize {
        let mut failed = 0;
        for (cycle, profiles) in &self.groups {
            let job = BackupRetentionJob::new(cycle.clone(), profiles.clone());
            failed += job.run_once().await.iter().filter(|r| r.is_err()).count();
        }
        failed
    }
}
