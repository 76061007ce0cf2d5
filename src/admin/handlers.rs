use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::compiler::CompiledConfig;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub epoch: u64,
    pub snapshot_id: Option<String>,
    pub routes: usize,
    pub workspaces: usize,
    pub sources: usize,
    pub skipped_plugins: usize,
}

#[derive(Serialize)]
pub struct SourceEntry {
    pub name: String,
    pub priority: i32,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let snapshot = state.engine.snapshot();
    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if snapshot.is_some() { "serving" } else { "waiting" },
        epoch: state.engine.epoch(),
        snapshot_id: snapshot.as_ref().map(|s| s.id.to_string()),
        routes: snapshot.as_ref().map_or(0, |s| s.config.route_count()),
        workspaces: snapshot.as_ref().map_or(0, |s| s.registry.workspaces().len()),
        sources: snapshot.as_ref().map_or(0, |s| s.registry.source_count()),
        skipped_plugins: snapshot.as_ref().map_or(0, |s| s.registry.skipped().len()),
    };
    Json(status)
}

pub async fn get_config(
    State(state): State<AdminState>,
) -> Result<Json<CompiledConfig>, StatusCode> {
    state
        .engine
        .snapshot()
        .map(|s| Json(s.config.clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_workspaces(State(state): State<AdminState>) -> Json<Vec<String>> {
    let workspaces = state
        .engine
        .snapshot()
        .map(|s| s.registry.workspaces().to_vec())
        .unwrap_or_default();
    Json(workspaces)
}

pub async fn get_sources(
    State(state): State<AdminState>,
    Path((workspace, provider)): Path<(String, String)>,
) -> Json<Vec<SourceEntry>> {
    let entries = state
        .engine
        .snapshot()
        .map(|s| {
            s.registry
                .sources(&workspace, &provider)
                .iter()
                .map(|source| SourceEntry {
                    name: source.name().to_string(),
                    priority: source.priority(),
                })
                .collect()
        })
        .unwrap_or_default();
    Json(entries)
}
