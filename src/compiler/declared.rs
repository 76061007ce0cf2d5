//! Declared configuration schema.
//!
//! This is the document an adapter hands over, in TOML or JSON:
//!
//! ```toml
//! [server]
//! listen = [":4122"]
//!
//! [[routes]]
//! path = ["/v1/graphql"]
//! methods = ["POST"]
//! handler = { name = "graphql", params = { workspace = "main" } }
//!
//! [[routes]]
//! path = ["/v1/rest"]
//! [[routes.routes]]
//! path = ["/v1/rest/users"]
//! handler = { name = "rest" }
//!
//! [sources]
//! "core.gateway.io/v1alpha1/workspaces" = [{ name = "billing" }]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::routing::HeaderConstraints;

/// Root of a declared configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeclaredConfig {
    /// HTTP server the routes are attached to.
    pub server: ServerDecl,

    /// Routes in evaluation order.
    pub routes: Vec<RouteDecl>,

    /// Plugin-type key ("group/version/resource") → plugin configurations.
    pub sources: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerDecl {
    pub name: String,
    pub listen: Vec<String>,
}

impl Default for ServerDecl {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            listen: vec![":4122".to_string()],
        }
    }
}

/// A declared route. Exactly one of `handler` or `routes` must be set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteDecl {
    /// Optional label used in diagnostics.
    pub name: Option<String>,

    pub path: Vec<String>,

    pub methods: Vec<String>,

    pub headers: HeaderConstraints,

    pub handler: Option<HandlerDecl>,

    /// Nested routes, compiled into a subrouter.
    pub routes: Vec<RouteDecl>,

    /// Stop evaluating later routes once this one matched.
    pub terminal: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerDecl {
    pub name: String,

    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}
