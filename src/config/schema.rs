//! Process settings schema.
//!
//! These settings describe how the control plane itself runs: which adapter
//! feeds it declared configuration, how reloads are debounced, and where logs,
//! metrics and the admin endpoint go. The declared routing configuration the
//! adapter produces lives in [`crate::compiler::declared`].

use serde::{Deserialize, Serialize};

/// Root settings for the control plane process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewaySettings {
    /// Where declared configuration comes from.
    pub config: ConfigSourceSettings,

    /// Log settings, shared with the compiled configuration.
    pub logging: LoggingSettings,

    /// Metrics exporter settings.
    pub observability: ObservabilityConfig,

    /// Read-only admin endpoint.
    pub admin: AdminConfig,
}

/// Adapter selection and reload behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigSourceSettings {
    /// Adapter name ("file" or "k8s").
    pub adapter: String,

    /// Path of the declared configuration file (file adapter only).
    pub path: String,

    /// Quiet period before a burst of changes is applied (e.g. "500ms", "2s").
    pub debounce_interval: String,
}

impl Default for ConfigSourceSettings {
    fn default() -> Self {
        Self {
            adapter: "file".to_string(),
            path: "gateway.toml".to_string(),
            debounce_interval: "500ms".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin endpoint.
    pub enabled: bool,

    /// Admin endpoint bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:2019".to_string(),
        }
    }
}
