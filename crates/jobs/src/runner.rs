use crate::BackupRetentionJob;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub trait SpawnableJob: Send + Sync + 'static {
    fn with_cancellation(self, token: CancellationToken) -> Self;
    fn start_job(self: Arc<Self>) -> JoinHandle<()>;
}

macro_rules! impl_spawnable_job {
    ($t:ty) => {
        impl SpawnableJob for $t {
            fn with_cancellation(self, token: CancellationToken) -> Self {
                self.with_cancellation(token)
            }

            fn start_job(self: Arc<Self>) -> JoinHandle<()> {
                tokio::spawn(async move { self.start().await })
            }
        }
    };
}

impl_spawnable_job!(BackupRetentionJob);

fn spawn_job<J: SpawnableJob>(job: J, shutdown: &Option<CancellationToken>) -> JoinHandle<()> {
    let job = match shutdown {
        Some(token) => job.with_cancellation(token.clone()),
        None => job,
    };
    Arc::new(job).start_job()
}

pub struct JobRunner {
    backup_retention: Vec<BackupRetentionJob>,
    shutdown: Option<CancellationToken>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            backup_retention: Vec::new(),
            shutdown: None,
        }
    }

    /// May be called once per group of profiles sharing a catalog.
    pub fn with_backup_retention(mut self, job: BackupRetentionJob) -> Self {
        self.backup_retention.push(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Spawns the configured jobs. The handles finish once the shutdown token
    /// is cancelled.
    pub async fn start(self) -> Vec<JoinHandle<()>> {
        info!("Starting background job runner");

        let handles: Vec<_> = self
            .backup_retention
            .into_iter()
            .map(|job| spawn_job(job, &self.shutdown))
            .collect();

        info!(jobs = handles.len(), "All background jobs started");
        handles
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
