//! Read-only admin endpoint.
//!
//! Exposes the active snapshot for inspection. Off by default and bound to
//! localhost; it never mutates configuration.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::engine::ActiveConfig;
use self::handlers::*;

#[derive(Clone)]
pub struct AdminState {
    pub engine: Arc<ActiveConfig>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/config", get(get_config))
        .route("/admin/workspaces", get(get_workspaces))
        .route("/admin/sources/{workspace}/{provider}", get(get_sources))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin router until `cancel` fires.
pub async fn serve(
    addr: SocketAddr,
    state: AdminState,
    cancel: CancellationToken,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Admin endpoint listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    tracing::info!("Admin endpoint stopped");
    Ok(())
}
