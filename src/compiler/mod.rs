//! Configuration compiler.
//!
//! # Data Flow
//! ```text
//! RawConfig (toml | json bytes)
//!     → declared.rs (deserialize DeclaredConfig)
//!     → validation.rs (structural checks, all errors collected)
//!     → routing builders (matcher set + handler chain | subrouter)
//!     → compiled.rs (CompiledConfig: admin + logging + apps)
//! ```
//!
//! # Design Decisions
//! - Pure: no I/O, no shared state; a failure leaves nothing half-applied
//! - Deterministic: struct field order and BTreeMap keys fix the byte output,
//!   so compiling the same snapshot twice gives identical payloads

use std::collections::BTreeMap;
use thiserror::Error;

use crate::adapter::{RawConfig, RawFormat};
use crate::config::GatewaySettings;
use crate::routing::{handler, matcher_set, subrouter, Route};

pub mod compiled;
pub mod declared;
pub mod validation;

pub use compiled::CompiledConfig;
pub use declared::{DeclaredConfig, HandlerDecl, RouteDecl, ServerDecl};
pub use validation::StructuralError;

use compiled::{
    AdminPersistence, AdminSection, Apps, HttpApp, HttpServer, LogSection, LoggingSection,
    SourceApp,
};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("configuration from {origin} is not valid UTF-8")]
    Utf8 { origin: String },

    #[error("malformed TOML configuration from {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("malformed JSON configuration from {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {}", join(.0))]
    Invalid(Vec<StructuralError>),

    #[error("failed to serialize compiled configuration: {0}")]
    Serialize(#[source] serde_json::Error),
}

fn join(errors: &[StructuralError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Turns raw snapshots into compiled descriptor trees.
#[derive(Debug, Clone)]
pub struct ConfigCompiler {
    log_level: String,
}

impl ConfigCompiler {
    pub fn new(log_level: impl AsRef<str>) -> Self {
        Self {
            log_level: log_level.as_ref().to_ascii_uppercase(),
        }
    }

    pub fn from_settings(settings: &GatewaySettings) -> Self {
        Self::new(&settings.logging.level)
    }

    pub fn compile(&self, raw: &RawConfig) -> Result<CompiledConfig, CompileError> {
        let declared = parse(raw)?;
        validation::validate(&declared).map_err(CompileError::Invalid)?;
        Ok(self.assemble(declared))
    }

    /// Compile and serialize in one step.
    pub fn compile_to_bytes(&self, raw: &RawConfig) -> Result<Vec<u8>, CompileError> {
        self.compile(raw)?.to_bytes().map_err(CompileError::Serialize)
    }

    fn assemble(&self, declared: DeclaredConfig) -> CompiledConfig {
        let routes = declared.routes.iter().map(compile_route).collect();

        let mut servers = BTreeMap::new();
        servers.insert(
            declared.server.name,
            HttpServer {
                listen: declared.server.listen,
                routes,
            },
        );

        let mut logs = BTreeMap::new();
        logs.insert(
            "default".to_string(),
            LogSection {
                level: self.log_level.clone(),
            },
        );

        CompiledConfig {
            admin: AdminSection {
                disabled: true,
                config: AdminPersistence { persist: false },
            },
            logging: LoggingSection { logs },
            apps: Apps {
                http: HttpApp { servers },
                source: SourceApp {
                    config: declared.sources,
                },
            },
        }
    }
}

fn parse(raw: &RawConfig) -> Result<DeclaredConfig, CompileError> {
    match raw.format() {
        RawFormat::Toml => {
            let text = std::str::from_utf8(raw.bytes()).map_err(|_| CompileError::Utf8 {
                origin: raw.origin().to_string(),
            })?;
            toml::from_str(text).map_err(|source| CompileError::Toml {
                origin: raw.origin().to_string(),
                source,
            })
        }
        RawFormat::Json => {
            serde_json::from_slice(raw.bytes()).map_err(|source| CompileError::Json {
                origin: raw.origin().to_string(),
                source,
            })
        }
    }
}

fn compile_route(decl: &RouteDecl) -> Route {
    let matcher = matcher_set(
        decl.path.iter().cloned(),
        decl.methods.iter().map(|m| m.to_ascii_uppercase()),
        decl.headers.clone(),
    );

    let handle = match &decl.handler {
        Some(h) => handler(&h.name, h.params.clone()),
        None => subrouter(decl.routes.iter().map(compile_route).collect()),
    };

    let route = Route::new(matcher, vec![handle]);
    if decl.terminal {
        route.terminal()
    } else {
        route
    }
}
