//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Build the serving engine and activate the initial configuration
//! - Start the admin endpoint, then watch for configuration changes
//!
//! # Design Decisions
//! - Fail fast: an initial load failure is fatal
//! - A watch that ends early keeps serving the last configuration until shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use crate::admin::{self, AdminState};
use crate::config::GatewaySettings;
use crate::engine::ActiveConfig;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::reload::ConfigLoader;
use crate::source::PluginFactory;
use crate::Result;

/// Run the control plane until `shutdown` is triggered.
pub async fn run(settings: GatewaySettings, shutdown: Shutdown) -> Result<()> {
    if settings.observability.metrics_enabled {
        match settings.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let engine = Arc::new(ActiveConfig::new(PluginFactory::with_builtins()));
    let loader = ConfigLoader::initialize(&settings, engine.clone()).await?;

    let admin_task = if settings.admin.enabled {
        match settings.admin.bind_address.parse::<SocketAddr>() {
            Ok(addr) => {
                let state = AdminState {
                    engine: engine.clone(),
                };
                let cancel = shutdown.token().child_token();
                Some(tokio::spawn(async move {
                    if let Err(e) = admin::serve(addr, state, cancel).await {
                        tracing::error!(error = %e, "Admin endpoint failed");
                    }
                }))
            }
            Err(_) => {
                tracing::error!(
                    bind_address = %settings.admin.bind_address,
                    "Failed to parse admin address"
                );
                None
            }
        }
    } else {
        None
    };

    loader.watch(shutdown.token()).await?;
    shutdown.token().cancelled().await;

    if let Some(task) = admin_task {
        let _ = task.await;
    }

    tracing::info!(epoch = engine.epoch(), "Shutdown complete");
    Ok(())
}
