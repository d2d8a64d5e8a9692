use backup_pruner_application::ports::MetricsSink;
use backup_pruner_domain::Config;
use backup_pruner_infrastructure::kanctl::KanctlExecutor;
use backup_pruner_infrastructure::kubernetes::KubeClient;
use backup_pruner_infrastructure::metrics::PrometheusMetricsSink;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub struct Adapters {
    /// One API client per namespace holding ActionSets.
    pub catalogs: BTreeMap<String, Arc<KubeClient>>,
    pub executor: Arc<KanctlExecutor>,
    pub metrics: Arc<dyn MetricsSink>,
}

impl Adapters {
    pub fn new<'a>(
        config: &Config,
        namespaces: impl IntoIterator<Item = &'a str>,
    ) -> anyhow::Result<Self> {
        let mut catalogs = BTreeMap::new();
        for namespace in namespaces {
            if catalogs.contains_key(namespace) {
                continue;
            }
            let client = KubeClient::from_config(&config.kubernetes, namespace)?;
            catalogs.insert(namespace.to_string(), Arc::new(client));
        }

        info!(
            kanctl = %config.kanister.kanctl_path,
            namespaces = catalogs.len(),
            "Adapters initialized"
        );

        Ok(Self {
            catalogs,
            executor: Arc::new(KanctlExecutor::new(&config.kanister.kanctl_path)),
            metrics: Arc::new(PrometheusMetricsSink::new()),
        })
    }
}
