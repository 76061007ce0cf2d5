//! Plugin factory registry.
//!
//! Maps a plugin-type key to the constructor that loads, provisions and
//! validates one plugin configuration in a single step.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::source::builtin;
use crate::source::Plugin;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("no plugin registered for `{0}`")]
    UnknownType(String),

    #[error("invalid plugin configuration: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("plugin validation failed: {0}")]
    Validation(String),
}

/// Builds one plugin from its raw configuration.
pub type Constructor = Arc<dyn Fn(&Value) -> Result<Plugin, PluginError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct PluginFactory {
    constructors: HashMap<String, Constructor>,
}

impl PluginFactory {
    /// An empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory with the builtin workspace and static-source types registered.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory
            .register(builtin::WORKSPACES_KEY, builtin::workspace)
            .register(builtin::STATIC_SOURCES_KEY, builtin::static_source);
        factory
    }

    /// Register (or replace) the constructor for `key`.
    pub fn register<F>(&mut self, key: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Plugin, PluginError> + Send + Sync + 'static,
    {
        self.constructors.insert(key.into(), Arc::new(constructor));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    pub fn instantiate(&self, key: &str, config: &Value) -> Result<Plugin, PluginError> {
        let constructor = self
            .constructors
            .get(key)
            .ok_or_else(|| PluginError::UnknownType(key.to_string()))?;
        constructor(config)
    }
}

impl fmt::Debug for PluginFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.constructors.keys().collect();
        keys.sort();
        f.debug_struct("PluginFactory").field("types", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_type() {
        let factory = PluginFactory::new();
        let err = factory.instantiate("x/v1/things", &json!({})).unwrap_err();
        assert!(matches!(err, PluginError::UnknownType(ref key) if key == "x/v1/things"));
    }

    #[test]
    fn test_builtins_registered() {
        let factory = PluginFactory::with_builtins();
        assert!(factory.contains(builtin::WORKSPACES_KEY));
        assert!(factory.contains(builtin::STATIC_SOURCES_KEY));

        let plugin = factory
            .instantiate(builtin::WORKSPACES_KEY, &json!({"name": "billing"}))
            .unwrap();
        assert!(matches!(plugin, Plugin::WorkspaceDeclaration(ref name) if name == "billing"));
    }

    #[test]
    fn test_register_replaces_constructor() {
        let mut factory = PluginFactory::with_builtins();
        factory.register(builtin::WORKSPACES_KEY, |_: &Value| {
            Ok(Plugin::Invalid {
                kind: "replaced".into(),
            })
        });
        let plugin = factory
            .instantiate(builtin::WORKSPACES_KEY, &json!({"name": "billing"}))
            .unwrap();
        assert!(matches!(plugin, Plugin::Invalid { .. }));
    }
}
