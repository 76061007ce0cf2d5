//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_config_reloads_total` (counter): reload cycles by outcome
//!   (`applied`, `unchanged`, `failed`)
//! - `gateway_config_active_epoch` (gauge): epoch of the active snapshot
//! - `gateway_registry_plugins_skipped_total` (counter): plugin configs left out
//!   of the registry, by reason (`load`, `invalid`)
//! - `gateway_registry_sources` (gauge): indexed sources in the active registry
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_reload(outcome: &'static str) {
    metrics::counter!("gateway_config_reloads_total", "outcome" => outcome).increment(1);
}

pub fn record_active_epoch(epoch: u64) {
    metrics::gauge!("gateway_config_active_epoch").set(epoch as f64);
}

pub fn record_plugin_skipped(reason: &'static str) {
    metrics::counter!("gateway_registry_plugins_skipped_total", "reason" => reason).increment(1);
}

pub fn record_source_count(count: usize) {
    metrics::gauge!("gateway_registry_sources").set(count as f64);
}
