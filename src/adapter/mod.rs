//! Configuration adapters.
//!
//! # Data Flow
//! ```text
//! backing store (file, cluster ConfigMap)
//!     → get_raw_config() (point-in-time snapshot, used at startup)
//!     → run(cancel)      (background watch, one RawConfig per change)
//!     → ConfigLoader
//! ```
//!
//! # Design Decisions
//! - Adapters never interpret the document; they hand over bytes + format
//! - A failed read is returned to the caller, which decides fatal vs. skip
//! - The watch channel closes when the cancellation token fires

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::{ConfigError, ConfigSourceSettings};

pub mod file;
pub mod kubernetes;

pub use file::FileAdapter;
pub use kubernetes::KubernetesAdapter;

/// Adapter name for the filesystem adapter.
pub const FILE_ADAPTER: &str = "file";

/// Adapter name for the cluster-native adapter.
pub const KUBERNETES_ADAPTER: &str = "k8s";

/// Encoding of a raw configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    Toml,
    Json,
}

impl fmt::Display for RawFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawFormat::Toml => f.write_str("toml"),
            RawFormat::Json => f.write_str("json"),
        }
    }
}

/// An unparsed configuration snapshot as produced by an adapter.
///
/// Cheap to clone; the bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConfig {
    format: RawFormat,
    origin: String,
    bytes: Arc<[u8]>,
}

impl RawConfig {
    pub fn new(format: RawFormat, origin: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            format,
            origin: origin.into(),
            bytes: Arc::from(bytes),
        }
    }

    pub fn toml(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(RawFormat::Toml, origin, text.into().into_bytes())
    }

    pub fn json(origin: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(RawFormat::Json, origin, bytes)
    }

    pub fn format(&self) -> RawFormat {
        self.format
    }

    /// Where the snapshot came from (a path, a ConfigMap reference, ...).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("not running inside a cluster: {0}")]
    NotInCluster(String),

    #[error("cluster request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config map `{0}` has neither a `config.json` nor a `config.toml` key")]
    MissingData(String),
}

/// A backend-specific reader/watcher of declared configuration.
pub trait ConfigAdapter: Send + Sync {
    /// Adapter name, for logs.
    fn name(&self) -> &'static str;

    /// Read the full configuration as it is right now.
    fn get_raw_config(&self) -> BoxFuture<'_, Result<RawConfig, AdapterError>>;

    /// Start watching for changes.
    ///
    /// Must be called from within a Tokio runtime. The receiver yields one
    /// snapshot per observed change and closes once `cancel` fires.
    fn run(
        &self,
        cancel: CancellationToken,
    ) -> Result<mpsc::UnboundedReceiver<RawConfig>, AdapterError>;
}

/// Build the adapter named in the settings.
pub fn resolve(settings: &ConfigSourceSettings) -> crate::Result<Box<dyn ConfigAdapter>> {
    match settings.adapter.as_str() {
        FILE_ADAPTER => Ok(Box::new(FileAdapter::new(&settings.path))),
        KUBERNETES_ADAPTER => Ok(Box::new(KubernetesAdapter::from_cluster_env()?)),
        other => Err(ConfigError::UnknownAdapter(other.to_string()).into()),
    }
}
