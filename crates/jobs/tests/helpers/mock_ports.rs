#![allow(dead_code)]

use async_trait::async_trait;
use backup_pruner_application::ports::{
    BackupCatalog, DeletionExecutor, DeletionJobStatus, MetricsSink, RetentionSnapshot,
};
use backup_pruner_application::use_cases::{DeleteExcessBackupsUseCase, RunRetentionCycleUseCase};
use backup_pruner_domain::{
    BackupRecord, BackupStatus, DeletionJobId, DeletionStatus, DeletionTarget, DomainError,
    RetentionPolicy, RetentionProfile,
};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

pub fn days_ago(id: &str, days: i64, profile: &str) -> BackupRecord {
    BackupRecord::new(
        id,
        Some(Utc::now() - ChronoDuration::days(days)),
        BackupStatus::Complete,
        profile,
    )
}

pub fn profile(policy: RetentionPolicy) -> RetentionProfile {
    RetentionProfile {
        policy,
        target: DeletionTarget {
            blueprint: "postgres-bp".to_string(),
            location_profile: "s3-profile".to_string(),
            namespace: "kanister".to_string(),
        },
    }
}

#[derive(Clone, Default)]
pub struct MockBackupCatalog {
    records: Arc<RwLock<Vec<BackupRecord>>>,
    list_calls: Arc<AtomicU64>,
}

impl MockBackupCatalog {
    pub fn with_records(records: Vec<BackupRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            list_calls: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub async fn identifiers(&self) -> Vec<String> {
        self.records
            .read()
            .await
            .iter()
            .map(|r| r.identifier.clone())
            .collect()
    }
}

#[async_trait]
impl BackupCatalog for MockBackupCatalog {
    async fn list_backups(&self) -> Result<Vec<BackupRecord>, DomainError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.read().await.clone())
    }

    async fn delete_backup(&self, identifier: &str) -> Result<(), DomainError> {
        self.records
            .write()
            .await
            .retain(|r| r.identifier != identifier);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockDeletionExecutor {
    outputs: Arc<Mutex<HashMap<String, String>>>,
}

impl MockDeletionExecutor {
    pub fn set_output(&self, backup_id: &str, output: &str) {
        self.outputs
            .lock()
            .unwrap()
            .insert(backup_id.to_string(), output.to_string());
    }
}

#[async_trait]
impl DeletionExecutor for MockDeletionExecutor {
    async fn submit_deletion(
        &self,
        backup_id: &str,
        _target: &DeletionTarget,
    ) -> Result<String, DomainError> {
        Ok(self
            .outputs
            .lock()
            .unwrap()
            .get(backup_id)
            .cloned()
            .unwrap_or_else(|| format!("actionset delete-{} created", backup_id)))
    }
}

/// Every job is already complete, or stuck in `running` when configured so.
#[derive(Clone, Default)]
pub struct MockDeletionJobStatus {
    stuck: Arc<Mutex<bool>>,
}

impl MockDeletionJobStatus {
    pub fn set_stuck(&self, stuck: bool) {
        *self.stuck.lock().unwrap() = stuck;
    }
}

#[async_trait]
impl DeletionJobStatus for MockDeletionJobStatus {
    async fn job_status(&self, _job: &DeletionJobId) -> Result<BackupStatus, DomainError> {
        if *self.stuck.lock().unwrap() {
            Ok(BackupStatus::Running)
        } else {
            Ok(BackupStatus::Complete)
        }
    }
}

#[derive(Clone, Default)]
pub struct RecordingMetricsSink {
    snapshots: Arc<Mutex<Vec<(String, RetentionSnapshot)>>>,
    failures: Arc<Mutex<Vec<String>>>,
}

impl RecordingMetricsSink {
    pub fn published_profiles(&self) -> Vec<String> {
        self.snapshots
            .lock()
            .unwrap()
            .iter()
            .map(|(profile, _)| profile.clone())
            .collect()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingMetricsSink {
    fn publish_snapshot(&self, profile: &str, snapshot: &RetentionSnapshot) {
        self.snapshots
            .lock()
            .unwrap()
            .push((profile.to_string(), snapshot.clone()));
    }

    fn record_deletion(&self, _profile: &str, _status: DeletionStatus) {}

    fn record_cycle_failure(&self, profile: &str) {
        self.failures.lock().unwrap().push(profile.to_string());
    }
}

pub struct Harness {
    pub catalog: MockBackupCatalog,
    pub executor: MockDeletionExecutor,
    pub job_status: MockDeletionJobStatus,
    pub metrics: RecordingMetricsSink,
    pub cycle: Arc<RunRetentionCycleUseCase>,
}

impl Harness {
    pub fn new(records: Vec<BackupRecord>) -> Self {
        let catalog = MockBackupCatalog::with_records(records);
        let executor = MockDeletionExecutor::default();
        let job_status = MockDeletionJobStatus::default();
        let metrics = RecordingMetricsSink::default();

        let delete_excess = DeleteExcessBackupsUseCase::new(
            Arc::new(executor.clone()),
            Arc::new(job_status.clone()),
            Arc::new(catalog.clone()),
        )
        .with_poll_interval(Duration::from_secs(1));
        let cycle = Arc::new(RunRetentionCycleUseCase::new(
            Arc::new(catalog.clone()),
            Arc::new(delete_excess),
            Arc::new(metrics.clone()),
        ));

        Self {
            catalog,
            executor,
            job_status,
            metrics,
            cycle,
        }
    }
}
