#![allow(dead_code)]

use async_trait::async_trait;
use backup_pruner_application::ports::{
    BackupCatalog, DeletionExecutor, DeletionJobStatus, MetricsSink, RetentionSnapshot,
};
use backup_pruner_domain::{
    BackupRecord, BackupStatus, DeletionJobId, DeletionStatus, DeletionTarget, DomainError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

/// Ordered record of calls made across several mocks.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[derive(Clone, Default)]
pub struct MockBackupCatalog {
    records: Arc<RwLock<Vec<BackupRecord>>>,
    deleted: Arc<RwLock<Vec<String>>>,
    list_calls: Arc<AtomicU64>,
    fail_list: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
    log: EventLog,
}

impl MockBackupCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<BackupRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            ..Self::default()
        }
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub async fn set_records(&self, records: Vec<BackupRecord>) {
        *self.records.write().await = records;
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub async fn deleted(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }

    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackupCatalog for MockBackupCatalog {
    async fn list_backups(&self) -> Result<Vec<BackupRecord>, DomainError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(DomainError::CatalogUnavailable(
                "mock catalog error".to_string(),
            ));
        }
        Ok(self.records.read().await.clone())
    }

    async fn delete_backup(&self, identifier: &str) -> Result<(), DomainError> {
        self.log.push(format!("catalog-delete:{}", identifier));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(DomainError::CatalogDeleteFailed {
                backup: identifier.to_string(),
                reason: "mock delete error".to_string(),
            });
        }
        self.records
            .write()
            .await
            .retain(|r| r.identifier != identifier);
        self.deleted.write().await.push(identifier.to_string());
        Ok(())
    }
}

/// Answers every submission with `actionset delete-<backup> created` unless
/// an output is scripted for that backup.
#[derive(Clone, Default)]
pub struct MockDeletionExecutor {
    submissions: Arc<Mutex<Vec<(String, DeletionTarget)>>>,
    outputs: Arc<Mutex<HashMap<String, String>>>,
    should_fail: Arc<AtomicBool>,
    log: EventLog,
}

impl MockDeletionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn set_output(&self, backup_id: &str, output: &str) {
        self.outputs
            .lock()
            .unwrap()
            .insert(backup_id.to_string(), output.to_string());
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submissions
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn targets(&self) -> Vec<DeletionTarget> {
        self.submissions
            .lock()
            .unwrap()
            .iter()
            .map(|(_, target)| target.clone())
            .collect()
    }
}

#[async_trait]
impl DeletionExecutor for MockDeletionExecutor {
    async fn submit_deletion(
        &self,
        backup_id: &str,
        target: &DeletionTarget,
    ) -> Result<String, DomainError> {
        self.log.push(format!("submit:{}", backup_id));
        self.submissions
            .lock()
            .unwrap()
            .push((backup_id.to_string(), target.clone()));

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::ExecutorFailed("kanctl not found".to_string()));
        }

        Ok(self
            .outputs
            .lock()
            .unwrap()
            .get(backup_id)
            .cloned()
            .unwrap_or_else(|| format!("actionset delete-{} created\n", backup_id)))
    }
}

/// Replays scripted states per job. The last scripted state repeats; jobs
/// without a script report `Complete`.
#[derive(Clone, Default)]
pub struct MockDeletionJobStatus {
    scripts: Arc<Mutex<HashMap<String, VecDeque<BackupStatus>>>>,
    polls: Arc<AtomicU64>,
    should_fail: Arc<AtomicBool>,
    log: EventLog,
}

impl MockDeletionJobStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn script(&self, job: &str, states: Vec<BackupStatus>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(job.to_string(), states.into());
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeletionJobStatus for MockDeletionJobStatus {
    async fn job_status(&self, job: &DeletionJobId) -> Result<BackupStatus, DomainError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::JobStatusUnavailable {
                job: job.to_string(),
                reason: "mock status error".to_string(),
            });
        }

        let state = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(job.as_str()) {
                Some(states) if states.len() > 1 => states.pop_front().unwrap(),
                Some(states) => states.front().copied().unwrap_or(BackupStatus::Complete),
                None => BackupStatus::Complete,
            }
        };
        self.log.push(format!("poll:{}:{}", job, state));
        Ok(state)
    }
}

#[derive(Clone, Default)]
pub struct RecordingMetricsSink {
    snapshots: Arc<Mutex<Vec<(String, RetentionSnapshot)>>>,
    deletions: Arc<Mutex<Vec<(String, DeletionStatus)>>>,
    failures: Arc<Mutex<Vec<String>>>,
}

impl RecordingMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<(String, RetentionSnapshot)> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn deletions(&self) -> Vec<(String, DeletionStatus)> {
        self.deletions.lock().unwrap().clone()
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

    fn record_deletion(&self, profile: &str, status: DeletionStatus) {
        self.deletions
            .lock()
            .unwrap()
            .push((profile.to_string(), status));
    }

    fn record_cycle_failure(&self, profile: &str) {
        self.failures.lock().unwrap().push(profile.to_string());
    }
}
