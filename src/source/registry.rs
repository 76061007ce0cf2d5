//! Workspace/provider index of content sources.
//!
//! # Responsibilities
//! - Instantiate every plugin blob under `apps.source.config`
//! - Classify each plugin once and index it by workspace and provider
//! - Keep each (workspace, provider) list ordered by descending priority
//!
//! # Design Decisions
//! - Built single-threaded, then never mutated; readers share it by `Arc`
//! - A failing plugin is recorded in `skipped()` and logged, nothing else changes

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;

use crate::observability::metrics;
use crate::source::{
    is_reserved_workspace, workspace_of, GroupVersionResource, Plugin, PluginFactory, Source,
    Sources,
};

/// Why a plugin config was left out of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Instantiation failed (unknown type, decode or validation error).
    Load(String),
    /// Loaded, but neither a workspace nor a source.
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPlugin {
    pub gvr: GroupVersionResource,
    /// Position of the blob within its type-key list.
    pub index: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: HashMap<String, HashMap<String, Sources>>,
    workspaces: Vec<String>,
    skipped: Vec<SkippedPlugin>,
}

impl SourceRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the registry from a compiled `apps.source.config` map.
    pub fn provision(factory: &PluginFactory, config: &BTreeMap<String, Vec<Value>>) -> Self {
        let mut registry = Self::empty();

        for (key, blobs) in config {
            let gvr = GroupVersionResource::for_key(key);
            for (index, blob) in blobs.iter().enumerate() {
                match factory.instantiate(key, blob) {
                    Ok(plugin) => registry.add(&gvr, index, plugin),
                    Err(e) => {
                        tracing::warn!(
                            group = %gvr.group,
                            version = %gvr.version,
                            resource = %gvr.resource,
                            index,
                            error = %e,
                            "Unable to load module for source"
                        );
                        metrics::record_plugin_skipped("load");
                        registry.skipped.push(SkippedPlugin {
                            gvr: gvr.clone(),
                            index,
                            reason: SkipReason::Load(e.to_string()),
                        });
                    }
                }
            }
        }

        for providers in registry.sources.values_mut() {
            for list in providers.values_mut() {
                list.sort_by_key(|s| Reverse(s.priority()));
            }
        }

        metrics::record_source_count(registry.source_count());
        tracing::debug!(
            workspaces = registry.workspaces.len(),
            sources = registry.source_count(),
            skipped = registry.skipped.len(),
            "Source registry provisioned"
        );
        registry
    }

    fn add(&mut self, gvr: &GroupVersionResource, index: usize, plugin: Plugin) {
        match plugin {
            Plugin::WorkspaceDeclaration(name) => {
                if is_reserved_workspace(&name) || self.workspaces.contains(&name) {
                    return;
                }
                self.workspaces.push(name);
            }
            Plugin::ContentSource(source) => {
                let providers = self
                    .sources
                    .entry(workspace_of(source.as_ref()).to_string())
                    .or_default();
                for provider in source.providers() {
                    providers
                        .entry(provider.clone())
                        .or_default()
                        .push(Arc::clone(&source));
                }
            }
            Plugin::Invalid { kind } => {
                tracing::error!(
                    group = %gvr.group,
                    version = %gvr.version,
                    resource = %gvr.resource,
                    index,
                    kind = %kind,
                    "Plugin is neither a workspace nor a source"
                );
                metrics::record_plugin_skipped("invalid");
                self.skipped.push(SkippedPlugin {
                    gvr: gvr.clone(),
                    index,
                    reason: SkipReason::Invalid(kind),
                });
            }
        }
    }

    /// Sources for (workspace, provider), highest priority first.
    pub fn sources(&self, workspace: &str, provider: &str) -> &[Arc<dyn Source>] {
        self.sources
            .get(workspace)
            .and_then(|providers| providers.get(provider))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Provider names known in `workspace`, sorted.
    pub fn providers(&self, workspace: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .sources
            .get(workspace)
            .map(|providers| providers.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Declared workspaces, reserved names excluded, in declaration order.
    pub fn workspaces(&self) -> &[String] {
        &self.workspaces
    }

    pub fn skipped(&self) -> &[SkippedPlugin] {
        &self.skipped
    }

    /// Number of distinct (workspace, provider, source) entries.
    pub fn source_count(&self) -> usize {
        self.sources
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }
}
