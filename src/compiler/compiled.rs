//! Compiled configuration: the descriptor tree handed to the serving engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::routing::Route;

/// Top-level descriptor: admin and logging settings plus the apps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledConfig {
    pub admin: AdminSection,
    pub logging: LoggingSection,
    pub apps: Apps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSection {
    pub disabled: bool,
    pub config: AdminPersistence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminPersistence {
    pub persist: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    pub logs: BTreeMap<String, LogSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apps {
    pub http: HttpApp,
    pub source: SourceApp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpApp {
    pub servers: BTreeMap<String, HttpServer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpServer {
    pub listen: Vec<String>,
    pub routes: Vec<Route>,
}

/// Plugin-type key → raw plugin configurations, provisioned at activation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceApp {
    pub config: BTreeMap<String, Vec<Value>>,
}

impl CompiledConfig {
    /// Indented JSON, the payload of the serving engine's load call.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Top-level routes of every server, servers in name order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.apps.http.servers.values().flat_map(|s| s.routes.iter())
    }

    /// Routes including those nested in subrouters.
    pub fn route_count(&self) -> usize {
        self.routes().map(Route::count).sum()
    }
}
