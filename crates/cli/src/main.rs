use anyhow::Context;
use backup_pruner_domain::CliOverrides;
use backup_pruner_jobs::JobRunner;
use clap::Parser;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "backup-pruner")]
#[command(version)]
#[command(about = "Enforces retention policies on Kanister backups")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", env = "BACKUP_PRUNER_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "BACKUP_PRUNER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Address of the metrics endpoint
    #[arg(long, env = "BACKUP_PRUNER_METRICS_BIND")]
    metrics_bind: Option<String>,

    /// Seconds between evaluation cycles
    #[arg(long, env = "BACKUP_PRUNER_INTERVAL_SECS")]
    interval_secs: Option<u64>,

    /// Namespace holding the Kanister ActionSets
    #[arg(short = 'n', long, env = "KANISTER_NAMESPACE")]
    kanister_namespace: Option<String>,

    /// Daily backups to retain
    #[arg(long, env = "DAILY_BACKUPS")]
    daily_backups: Option<u32>,

    /// Weekly backups to retain
    #[arg(long, env = "WEEKLY_BACKUPS")]
    weekly_backups: Option<u32>,

    /// Blueprint used for deletion actions
    #[arg(long, env = "BLUEPRINT_NAME")]
    blueprint_name: Option<String>,

    /// Kanister profile of the backup object store
    #[arg(long, env = "S3_PROFILE")]
    s3_profile: Option<String>,

    /// Run one cycle for every profile and exit
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            log_level: self.log_level.clone(),
            metrics_bind: self.metrics_bind.clone(),
            interval_secs: self.interval_secs,
            kanister_namespace: self.kanister_namespace.clone(),
            daily_backups: self.daily_backups,
            weekly_backups: self.weekly_backups,
            blueprint_name: self.blueprint_name.clone(),
            location_profile: self.s3_profile.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config.logging);

    info!("Starting backup-pruner v{}", env!("CARGO_PKG_VERSION"));

    let profiles = config.retention_profiles()?;
    let services = di::Services::new(&config, profiles)?;

    if cli.once {
        let failed = services.run_once().await;
        if failed > 0 {
            anyhow::bail!("{} retention cycle(s) failed", failed);
        }
        info!("All retention cycles completed");
        return Ok(());
    }

    backup_pruner_infrastructure::metrics::init_metrics()?;

    let metrics_addr: SocketAddr = config
        .server
        .metrics_bind
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid metrics bind {}: {}", config.server.metrics_bind, e))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(bootstrap::cancel_on_signal(shutdown.clone()));

    let mut runner = JobRunner::new().with_shutdown_token(shutdown.clone());
    for job in services.into_jobs(config.schedule.interval_secs) {
        runner = runner.with_backup_retention(job);
    }
    let handles = runner.start().await;

    let served = server::start_metrics_server(metrics_addr, shutdown.clone()).await;
    if let Err(e) = &served {
        error!(error = %e, "Metrics server error");
        shutdown.cancel();
    }

    for handle in handles {
        handle.await?;
    }

    served.context("metrics server failed")?;
    info!("Shutdown complete");
    Ok(())
}
