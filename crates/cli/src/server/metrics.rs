use axum::{routing::get, Router};
use backup_pruner_infrastructure::metrics::serve_metrics;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Serves `/metrics` and `/healthz` until `shutdown` is cancelled.
pub async fn start_metrics_server(
    bind_addr: SocketAddr,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    info!(
        bind_address = %bind_addr,
        metrics_url = format!("http://{}/metrics", bind_addr),
        "Starting metrics server"
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    axum::serve(listener, create_app())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Metrics server stopped");
    Ok(())
}

fn create_app() -> Router {
    Router::new()
        .route("/metrics", get(serve_metrics))
        .route("/healthz", get(healthz_handler))
        .layer(TraceLayer::new_for_http())
}

async fn healthz_handler() -> &'static str {
    "ok"
}
