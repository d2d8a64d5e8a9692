//! Prometheus metrics for retention cycles.
//!
//! Every series is labelled with `profile`, so cycles of different profiles
//! write disjoint series.

use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use backup_pruner_application::ports::{MetricsSink, RetentionSnapshot};
use backup_pruner_domain::DeletionStatus;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Backups of a profile per status bucket.
pub const BACKUP_COUNT: &str = "backup_count";

/// Complete backups inside the retention window.
pub const BACKUP_RETAINED_COUNT: &str = "backup_retained_count";

pub const BACKUP_OLDEST_RETAINED: &str = "backup_oldest_retained_timestamp_seconds";

pub const BACKUP_NEWEST_RETAINED: &str = "backup_newest_retained_timestamp_seconds";

pub const BACKUP_DELETIONS_TOTAL: &str = "backup_deletions_total";

pub const BACKUP_CYCLE_FAILURES_TOTAL: &str = "backup_cycle_failures_total";

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder. Later calls return the handle
/// installed by the first one.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    tracing::info!("Prometheus metrics recorder initialized");

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

fn describe_metrics() {
    describe_gauge!(BACKUP_COUNT, "Backups per profile and status");
    describe_gauge!(
        BACKUP_RETAINED_COUNT,
        "Complete backups inside the retention window"
    );
    describe_gauge!(
        BACKUP_OLDEST_RETAINED,
        "Creation time of the oldest retained backup, 0 when none"
    );
    describe_gauge!(
        BACKUP_NEWEST_RETAINED,
        "Creation time of the newest retained backup, 0 when none"
    );
    describe_counter!(BACKUP_DELETIONS_TOTAL, "Finished deletion jobs by outcome");
    describe_counter!(BACKUP_CYCLE_FAILURES_TOTAL, "Evaluation cycles that failed");
}

#[must_use]
pub fn prometheus_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

/// Handler for the `/metrics` endpoint.
pub async fn serve_metrics() -> impl IntoResponse {
    match prometheus_handle() {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [("content-type", "text/plain; charset=utf-8")],
            "Metrics not initialized".to_string(),
        ),
    }
}

/// [`MetricsSink`] backed by whichever `metrics` recorder is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusMetricsSink;

impl PrometheusMetricsSink {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for PrometheusMetricsSink {
    fn publish_snapshot(&self, profile: &str, snapshot: &RetentionSnapshot) {
        for (bucket, count) in snapshot.counts.iter() {
            gauge!(BACKUP_COUNT, "profile" => profile.to_string(), "status" => bucket.as_str())
                .set(count as f64);
        }

        let labels = [("profile", profile.to_string())];
        gauge!(BACKUP_RETAINED_COUNT, &labels).set(snapshot.retained as f64);
        gauge!(BACKUP_OLDEST_RETAINED, &labels).set(snapshot.oldest_retained as f64);
        gauge!(BACKUP_NEWEST_RETAINED, &labels).set(snapshot.newest_retained as f64);

        tracing::debug!(
            profile = %profile,
            retained = snapshot.retained,
            total = snapshot.counts.total(),
            "Published retention metrics"
        );
    }

    fn record_deletion(&self, profile: &str, status: DeletionStatus) {
        counter!(
            BACKUP_DELETIONS_TOTAL,
            "profile" => profile.to_string(),
            "outcome" => status.as_str()
        )
        .increment(1);
    }

    fn record_cycle_failure(&self, profile: &str) {
        counter!(BACKUP_CYCLE_FAILURES_TOTAL, "profile" => profile.to_string()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backup_pruner_domain::{BackupStatus, StatusCounts};

    fn render_with(f: impl FnOnce(&PrometheusMetricsSink)) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || f(&PrometheusMetricsSink::new()));
        handle.render()
    }

    #[test]
    fn test_snapshot_sets_every_status_bucket() {
        let mut counts = StatusCounts::new();
        counts.record(BackupStatus::Complete);
        counts.record(BackupStatus::Complete);
        counts.record(BackupStatus::Running);

        let output = render_with(|sink| {
            sink.publish_snapshot(
                "daily",
                &RetentionSnapshot {
                    counts,
                    retained: 2,
                    oldest_retained: 1_641_000_000,
                    newest_retained: 1_641_500_000,
                },
            )
        });

        assert!(output.contains(r#"backup_count{profile="daily",status="complete"} 2"#));
        assert!(output.contains(r#"backup_count{profile="daily",status="running"} 1"#));
        assert!(output.contains(r#"backup_count{profile="daily",status="deleting"} 0"#));
        assert!(output.contains(r#"backup_retained_count{profile="daily"} 2"#));
        assert!(output.contains(
            r#"backup_oldest_retained_timestamp_seconds{profile="daily"} 1641000000"#
        ));
    }

    #[test]
    fn test_profiles_write_separate_series() {
        let output = render_with(|sink| {
            sink.publish_snapshot("daily", &RetentionSnapshot::default());
            sink.record_deletion("daily", DeletionStatus::Completed);
            sink.record_deletion("weekly", DeletionStatus::Failed);
            sink.record_cycle_failure("weekly");
        });

        assert!(output.contains(r#"backup_retained_count{profile="daily"} 0"#));
        assert!(output.contains(r#"backup_deletions_total{profile="daily",outcome="completed"} 1"#));
        assert!(output.contains(r#"backup_deletions_total{profile="weekly",outcome="failed"} 1"#));
        assert!(output.contains(r#"backup_cycle_failures_total{profile="weekly"} 1"#));
        assert!(!output.contains(r#"backup_retained_count{profile="weekly"}"#));
    }
}
