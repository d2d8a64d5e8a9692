use super::actionset::{decode, ActionSet, ActionSetList, Decoded};
use async_trait::async_trait;
use backup_pruner_application::ports::{BackupCatalog, DeletionJobStatus};
use backup_pruner_domain::config::KubernetesConfig;
use backup_pruner_domain::{BackupRecord, BackupStatus, DeletionJobId, DomainError};
use reqwest::{Method, RequestBuilder, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

const ACTIONSETS_API: &str = "apis/cr.kanister.io/v1alpha1";
const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bearer token for the API server. File tokens are re-read on every request
/// because projected service account tokens are rotated.
#[derive(Debug, Clone)]
pub enum TokenSource {
    None,
    Static(String),
    File(PathBuf),
}

impl TokenSource {
    async fn token(&self) -> Result<Option<String>, String> {
        match self {
            Self::None => Ok(None),
            Self::Static(token) => Ok(Some(token.clone())),
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .map(|t| Some(t.trim().to_string()))
                .map_err(|e| format!("failed to read token {}: {}", path.display(), e)),
        }
    }
}

/// REST client for Kanister `ActionSet` resources in one namespace.
pub struct KubeClient {
    http: reqwest::Client,
    base_url: String,
    token: TokenSource,
    namespace: String,
}

impl KubeClient {
    pub fn new(
        base_url: impl Into<String>,
        token: TokenSource,
        namespace: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::CatalogUnavailable(format!("HTTP client: {}", e)))?;
        Ok(Self::with_http(http, base_url, token, namespace))
    }

    fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: TokenSource,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            namespace: namespace.into(),
        }
    }

    /// Builds a client from configuration, falling back to the in-cluster
    /// service account for anything not set.
    pub fn from_config(config: &KubernetesConfig, namespace: &str) -> Result<Self, DomainError> {
        let unavailable = |msg: String| DomainError::CatalogUnavailable(msg);

        let base_url = match &config.api_server {
            Some(url) => url.clone(),
            None => {
                let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
                    unavailable("KUBERNETES_SERVICE_HOST is not set and no api_server configured".to_string())
                })?;
                let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());
                if host.contains(':') {
                    format!("https://[{}]:{}", host, port)
                } else {
                    format!("https://{}:{}", host, port)
                }
            }
        };

        let token = match &config.token_path {
            Some(path) => TokenSource::File(PathBuf::from(path)),
            None if config.api_server.is_none() => {
                TokenSource::File(PathBuf::from(SERVICE_ACCOUNT_DIR).join("token"))
            }
            None => TokenSource::None,
        };

        let ca_path = config.ca_cert_path.clone().map(PathBuf::from).or_else(|| {
            config
                .api_server
                .is_none()
                .then(|| PathBuf::from(SERVICE_ACCOUNT_DIR).join("ca.crt"))
        });

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT);

        if let Some(path) = ca_path {
            let pem = std::fs::read(&path)
                .map_err(|e| unavailable(format!("failed to read CA {}: {}", path.display(), e)))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| unavailable(format!("invalid CA {}: {}", path.display(), e)))?;
            builder = builder.add_root_certificate(cert);
        }
        if config.accept_invalid_certs {
            warn!("TLS certificate verification disabled for the Kubernetes API");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| unavailable(format!("HTTP client: {}", e)))?;

        info!(api_server = %base_url, namespace = %namespace, "Kubernetes client configured");
        Ok(Self::with_http(http, base_url, token, namespace))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/{}/namespaces/{}/actionsets",
            self.base_url, ACTIONSETS_API, self.namespace
        )
    }

    fn item_url(&self, name: &str) -> String {
        format!("{}/{}", self.collection_url(), name)
    }

    async fn request(&self, method: Method, url: String) -> Result<RequestBuilder, String> {
        let mut request = self.http.request(method, url);
        if let Some(token) = self.token.token().await? {
            request = request.bearer_auth(token);
        }
        Ok(request.header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn get_action_set(&self, name: &str) -> Result<ActionSet, String> {
        let response = self
            .request(Method::GET, self.item_url(name))
            .await?
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("GET {} returned {}", name, status));
        }
        response.json::<ActionSet>().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl BackupCatalog for KubeClient {
    async fn list_backups(&self) -> Result<Vec<BackupRecord>, DomainError> {
        let response = self
            .request(Method::GET, self.collection_url())
            .await
            .map_err(DomainError::CatalogUnavailable)?
            .send()
            .await
            .map_err(|e| DomainError::CatalogUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::CatalogUnavailable(format!(
                "listing actionsets in {} returned {}",
                self.namespace, status
            )));
        }

        let list = response
            .json::<ActionSetList>()
            .await
            .map_err(|e| DomainError::CatalogUnavailable(e.to_string()))?;

        let total = list.items.len();
        let mut records = Vec::with_capacity(total);
        for item in list.items {
            match decode(item) {
                Decoded::Backup(record) => records.push(record),
                Decoded::Skip(reason) => debug!(reason = %reason, "Skipping actionset"),
            }
        }

        debug!(
            namespace = %self.namespace,
            actionsets = total,
            backups = records.len(),
            "Actionsets listed"
        );
        Ok(records)
    }

    async fn delete_backup(&self, identifier: &str) -> Result<(), DomainError> {
        let failed = |reason: String| DomainError::CatalogDeleteFailed {
            backup: identifier.to_string(),
            reason,
        };

        let response = self
            .request(Method::DELETE, self.item_url(identifier))
            .await
            .map_err(failed)?
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(backup = %identifier, "Actionset already gone");
                Ok(())
            }
            status => Err(failed(format!("DELETE returned {}", status))),
        }
    }
}

#[async_trait]
impl DeletionJobStatus for KubeClient {
    async fn job_status(&self, job: &DeletionJobId) -> Result<BackupStatus, DomainError> {
        self.get_action_set(job.as_str())
            .await
            .map(|action_set| action_set.state())
            .map_err(|reason| DomainError::JobStatusUnavailable {
                job: job.to_string(),
                reason,
            })
    }
}
