use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address of the `/metrics` and `/healthz` endpoints.
    #[serde(default = "default_metrics_bind")]
    pub metrics_bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            metrics_bind: default_metrics_bind(),
        }
    }
}

fn default_metrics_bind() -> String {
    "0.0.0.0:2112".to_string()
}
