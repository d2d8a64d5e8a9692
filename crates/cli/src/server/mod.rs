pub mod metrics;

pub use metrics::start_metrics_server;
