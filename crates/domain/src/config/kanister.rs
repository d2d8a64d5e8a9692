use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KanisterConfig {
    /// Namespace holding the ActionSets, used when a profile sets none.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_kanctl_path")]
    pub kanctl_path: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum wait for one deletion job; 0 waits until the job finishes.
    #[serde(default)]
    pub poll_timeout_secs: u64,
}

impl KanisterConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        (self.poll_timeout_secs > 0).then(|| Duration::from_secs(self.poll_timeout_secs))
    }
}

impl Default for KanisterConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            kanctl_path: default_kanctl_path(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_timeout_secs: 0,
        }
    }
}

/// Access to the Kubernetes API. Every field unset means in-cluster config.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KubernetesConfig {
    #[serde(default)]
    pub api_server: Option<String>,

    #[serde(default)]
    pub token_path: Option<String>,

    #[serde(default)]
    pub ca_cert_path: Option<String>,

    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_namespace() -> String {
    "kanister".to_string()
}

fn default_kanctl_path() -> String {
    "/usr/local/bin/kanctl".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}
