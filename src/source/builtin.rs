//! Builtin plugin types.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::source::factory::PluginError;
use crate::source::{Plugin, Source};

pub const WORKSPACES_KEY: &str = "core.gateway.io/v1alpha1/workspaces";
pub const STATIC_SOURCES_KEY: &str = "core.gateway.io/v1alpha1/staticsources";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkspaceSpec {
    name: String,
}

/// Constructor for workspace declarations: `{ "name": .. }`.
pub fn workspace(config: &Value) -> Result<Plugin, PluginError> {
    let spec = WorkspaceSpec::deserialize(config)?;
    if spec.name.trim().is_empty() {
        return Err(PluginError::Validation("workspace name must not be empty".into()));
    }
    Ok(Plugin::WorkspaceDeclaration(spec.name))
}

/// A source carrying only its declared metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticSource {
    name: String,
    #[serde(default)]
    workspace: Option<String>,
    providers: Vec<String>,
    #[serde(default)]
    priority: i32,
}

impl StaticSource {
    pub fn new(
        name: impl Into<String>,
        workspace: Option<String>,
        providers: Vec<String>,
        priority: i32,
    ) -> Self {
        Self {
            name: name.into(),
            workspace,
            providers,
            priority,
        }
    }
}

impl Source for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn providers(&self) -> &[String] {
        &self.providers
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }
}

/// Constructor for static sources:
/// `{ "name": .., "workspace"?: .., "providers": [..], "priority"?: .. }`.
pub fn static_source(config: &Value) -> Result<Plugin, PluginError> {
    let source = StaticSource::deserialize(config)?;
    if source.name.trim().is_empty() {
        return Err(PluginError::Validation("source name must not be empty".into()));
    }
    if source.providers.is_empty() {
        return Err(PluginError::Validation(format!(
            "source `{}` declares no providers",
            source.name
        )));
    }
    Ok(Plugin::ContentSource(Arc::new(source)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workspace_declaration() {
        let plugin = workspace(&json!({"name": "billing"})).unwrap();
        assert!(matches!(plugin, Plugin::WorkspaceDeclaration(ref n) if n == "billing"));
    }

    #[test]
    fn test_workspace_rejects_bad_config() {
        assert!(matches!(workspace(&json!({})), Err(PluginError::Decode(_))));
        assert!(matches!(
            workspace(&json!({"name": " "})),
            Err(PluginError::Validation(_))
        ));
    }

    #[test]
    fn test_static_source() {
        let plugin = static_source(&json!({
            "name": "orders-db",
            "workspace": "billing",
            "providers": ["postgres", "graphql"],
            "priority": 10
        }))
        .unwrap();
        let Plugin::ContentSource(source) = plugin else {
            panic!("expected a content source");
        };
        assert_eq!(source.name(), "orders-db");
        assert_eq!(source.workspace(), Some("billing"));
        assert_eq!(source.providers(), ["postgres".to_string(), "graphql".to_string()]);
        assert_eq!(source.priority(), 10);
    }

    #[test]
    fn test_static_source_needs_providers() {
        let err = static_source(&json!({"name": "x", "providers": []})).unwrap_err();
        assert!(matches!(err, PluginError::Validation(_)));
    }
}
