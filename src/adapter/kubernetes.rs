//! Cluster-native adapter.
//!
//! Reads the `gateway-config` ConfigMap from the pod's own namespace using the
//! mounted service-account credentials, and polls it for new resource
//! versions. No settings beyond the ambient cluster credentials are needed.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::adapter::{AdapterError, ConfigAdapter, RawConfig, KUBERNETES_ADAPTER};

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Name of the ConfigMap holding the declared configuration.
pub const CONFIG_MAP_NAME: &str = "gateway-config";

const JSON_KEY: &str = "config.json";
const TOML_KEY: &str = "config.toml";

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ConfigMap {
    metadata: ObjectMeta,
    #[serde(default)]
    data: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMeta {
    #[serde(default)]
    resource_version: String,
}

/// Remembers the last emitted `resourceVersion`.
#[derive(Debug, Default)]
struct VersionTracker {
    last: Option<String>,
}

impl VersionTracker {
    /// True if `version` differs from the last one seen. The first call always is.
    fn observe(&mut self, version: &str) -> bool {
        if self.last.as_deref() == Some(version) {
            return false;
        }
        self.last = Some(version.to_string());
        true
    }
}

#[derive(Debug, Clone)]
pub struct KubernetesAdapter {
    client: reqwest::Client,
    api_server: String,
    token: String,
    namespace: String,
}

impl KubernetesAdapter {
    pub fn new(
        client: reqwest::Client,
        api_server: impl Into<String>,
        token: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_server: api_server.into(),
            token: token.into(),
            namespace: namespace.into(),
        }
    }

    /// Build an adapter from the in-cluster environment and service-account mount.
    pub fn from_cluster_env() -> Result<Self, AdapterError> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
            AdapterError::NotInCluster("KUBERNETES_SERVICE_HOST is not set".to_string())
        })?;
        let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

        let dir = Path::new(SERVICE_ACCOUNT_DIR);
        let token = read_trimmed(&dir.join("token"))?;
        let namespace = read_trimmed(&dir.join("namespace"))?;
        let ca_path = dir.join("ca.crt");
        let ca = std::fs::read(&ca_path).map_err(|source| AdapterError::Read {
            path: ca_path,
            source,
        })?;

        let client = reqwest::Client::builder()
            .add_root_certificate(reqwest::Certificate::from_pem(&ca)?)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::new(client, api_server_url(&host, &port), token, namespace))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn config_map_url(&self) -> String {
        format!(
            "{}/api/v1/namespaces/{}/configmaps/{}",
            self.api_server, self.namespace, CONFIG_MAP_NAME
        )
    }

    fn origin(&self) -> String {
        format!("configmap/{}/{}", self.namespace, CONFIG_MAP_NAME)
    }

    async fn fetch(&self) -> Result<(String, RawConfig), AdapterError> {
        let config_map: ConfigMap = self
            .client
            .get(self.config_map_url())
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let version = config_map.metadata.resource_version.clone();
        Ok((version, raw_from_config_map(config_map, self.origin())?))
    }
}

fn api_server_url(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("https://[{}]:{}", host, port)
    } else {
        format!("https://{}:{}", host, port)
    }
}

fn read_trimmed(path: &Path) -> Result<String, AdapterError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| AdapterError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn raw_from_config_map(mut config_map: ConfigMap, origin: String) -> Result<RawConfig, AdapterError> {
    if let Some(json) = config_map.data.remove(JSON_KEY) {
        return Ok(RawConfig::json(origin, json.into_bytes()));
    }
    if let Some(toml) = config_map.data.remove(TOML_KEY) {
        return Ok(RawConfig::toml(origin, toml));
    }
    Err(AdapterError::MissingData(CONFIG_MAP_NAME.to_string()))
}

impl ConfigAdapter for KubernetesAdapter {
    fn name(&self) -> &'static str {
        KUBERNETES_ADAPTER
    }

    fn get_raw_config(&self) -> BoxFuture<'_, Result<RawConfig, AdapterError>> {
        Box::pin(async move { self.fetch().await.map(|(_, raw)| raw) })
    }

    fn run(
        &self,
        cancel: CancellationToken,
    ) -> Result<mpsc::UnboundedReceiver<RawConfig>, AdapterError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let adapter = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            let mut versions = VersionTracker::default();

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        match adapter.fetch().await {
                            Ok((version, raw)) => {
                                if !versions.observe(&version) {
                                    continue;
                                }
                                tracing::debug!(resource_version = %version, "ConfigMap changed");
                                if tx.send(raw).is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, namespace = %adapter.namespace, "Failed to poll ConfigMap");
                            }
                        }
                    }
                }
            }
            tracing::info!(namespace = %adapter.namespace, "ConfigMap watcher stopped");
        });

        tracing::info!(namespace = %self.namespace, config_map = CONFIG_MAP_NAME, "ConfigMap watcher started");
        Ok(rx)
    }
}
