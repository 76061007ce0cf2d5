//! Source registry subsystem.
//!
//! # Data Flow
//! ```text
//! apps.source.config (type key → plugin configs)
//!     → factory.rs (constructor per type key: load + provision + validate)
//!     → Plugin (WorkspaceDeclaration | ContentSource | Invalid)
//!     → registry.rs (workspace → provider → sources, sorted by priority)
//!     → immutable SourceRegistry, published with the active snapshot
//! ```
//!
//! # Design Decisions
//! - One bad plugin config is logged and skipped; it never blocks the others
//! - Capability is decided once, by the constructor, as a tagged variant
//! - "main" and "root" are implicit workspaces and never listed

use std::fmt;
use std::sync::Arc;

pub mod builtin;
pub mod factory;
pub mod gvr;
pub mod registry;

pub use factory::{PluginError, PluginFactory};
pub use gvr::GroupVersionResource;
pub use registry::{SkipReason, SkippedPlugin, SourceRegistry};

/// The implicit default workspace.
pub const MAIN_WORKSPACE: &str = "main";

/// The implicit root workspace.
pub const ROOT_WORKSPACE: &str = "root";

/// Workspaces that are never part of the visible workspace list.
pub const RESERVED_WORKSPACES: [&str; 2] = [MAIN_WORKSPACE, ROOT_WORKSPACE];

pub fn is_reserved_workspace(name: &str) -> bool {
    RESERVED_WORKSPACES.contains(&name)
}

/// A pluggable provider of routable content.
pub trait Source: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Providers this source serves.
    fn providers(&self) -> &[String];

    /// Ordering key; higher priority sorts first.
    fn priority(&self) -> i32;

    /// Declared workspace, if any.
    fn workspace(&self) -> Option<&str> {
        None
    }
}

/// Sources of one (workspace, provider) pair, in registry order.
pub type Sources = Vec<Arc<dyn Source>>;

/// Workspace a source belongs to, defaulting to "main".
pub fn workspace_of(source: &dyn Source) -> &str {
    match source.workspace() {
        Some(name) if !name.is_empty() => name,
        _ => MAIN_WORKSPACE,
    }
}

/// What an instantiated plugin turned out to be.
#[derive(Debug, Clone)]
pub enum Plugin {
    /// Names a workspace; contributes no routes.
    WorkspaceDeclaration(String),
    ContentSource(Arc<dyn Source>),
    /// Loaded, but neither a workspace nor a source.
    Invalid { kind: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::builtin::StaticSource;

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved_workspace("main"));
        assert!(is_reserved_workspace("root"));
        assert!(!is_reserved_workspace("Main"));
        assert!(!is_reserved_workspace("billing"));
    }

    #[test]
    fn test_workspace_defaults_to_main() {
        let unset = StaticSource::new("a", None, vec!["db".into()], 0);
        let empty = StaticSource::new("b", Some(String::new()), vec!["db".into()], 0);
        let set = StaticSource::new("c", Some("billing".into()), vec!["db".into()], 0);
        assert_eq!(workspace_of(&unset), MAIN_WORKSPACE);
        assert_eq!(workspace_of(&empty), MAIN_WORKSPACE);
        assert_eq!(workspace_of(&set), "billing");
    }
}
