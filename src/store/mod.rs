//! Cluster-wide key/value store contract.
//!
//! The store holds project resources and the set of registered control-plane
//! nodes. Watchers are told about every change, keyed by resource id
//! (`<project>/<kind>/<name>`).
//!
//! The control-plane binary does not open a store; this is the contract that
//! store backends implement, with `MemoryStore` as the in-process one.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid resource id `{0}`: expected `<project>/<kind>/<name>`")]
    InvalidId(String),

    #[error("resource `{0}` not found")]
    NotFound(String),

    #[error("project `{0}` has no resources")]
    UnknownProject(String),
}

/// What happened to a watched entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Put,
    Delete,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Put => f.write_str("put"),
            EventKind::Delete => f.write_str("delete"),
        }
    }
}

/// Parsed form of `<project>/<kind>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub project: String,
    pub kind: String,
    pub name: String,
}

impl ResourceId {
    pub fn parse(id: &str) -> Result<Self, StoreError> {
        let mut parts = id.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(project), Some(kind), Some(name))
                if !project.is_empty() && !kind.is_empty() && !name.is_empty() =>
            {
                Ok(Self {
                    project: project.to_string(),
                    kind: kind.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(StoreError::InvalidId(id.to_string())),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project, self.kind, self.name)
    }
}

/// A registered control-plane node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
}

/// Every stored resource, grouped by project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub projects: BTreeMap<String, BTreeMap<String, Value>>,
}

impl GlobalConfig {
    /// Resource by full id.
    pub fn resource(&self, id: &ResourceId) -> Option<&Value> {
        self.projects
            .get(&id.project)
            .and_then(|resources| resources.get(&id.to_string()))
    }
}

/// Called with the event, the affected service id and the current service set.
pub type ServiceCallback = Arc<dyn Fn(EventKind, &str, &[Service]) + Send + Sync>;

/// Called with the event, the resource id and the new value (`None` on delete).
pub type ResourceCallback = Arc<dyn Fn(EventKind, &ResourceId, Option<&Value>) + Send + Sync>;

pub trait Store: Send + Sync {
    /// Subscribe to node registrations.
    fn watch_services(&self, callback: ServiceCallback) -> Result<(), StoreError>;

    /// Subscribe to resource changes. Existing resources are replayed as puts;
    /// a put racing with the subscription may be seen twice, never missed.
    fn watch_resources(&self, callback: ResourceCallback) -> Result<(), StoreError>;

    /// Register this node as a service.
    fn register(&self);

    fn set_resource<'a>(&'a self, id: &'a str, value: Value)
        -> BoxFuture<'a, Result<(), StoreError>>;

    fn delete_resource<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Delete every resource of a project.
    fn delete_project<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<(), StoreError>>;

    fn get_global_config(&self) -> Result<GlobalConfig, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id() {
        let id = ResourceId::parse("shop/db/orders").unwrap();
        assert_eq!(id.project, "shop");
        assert_eq!(id.kind, "db");
        assert_eq!(id.name, "orders");
        assert_eq!(id.to_string(), "shop/db/orders");

        // names may contain further separators
        assert_eq!(ResourceId::parse("shop/file/a/b").unwrap().name, "a/b");

        assert!(ResourceId::parse("shop/db").is_err());
        assert!(ResourceId::parse("shop//orders").is_err());
    }
}
