//! Dynamic configuration control plane for a reverse-proxying gateway.
//!
//! Watches a pluggable configuration source, compiles the declared routes into
//! a wire-ready descriptor tree, and publishes it together with a registry of
//! content sources grouped by workspace and provider.

// Configuration pipeline
pub mod adapter;
pub mod compiler;
pub mod config;
pub mod reload;
pub mod routing;

// Serving side
pub mod engine;
pub mod source;
pub mod store;

// Cross-cutting concerns
pub mod admin;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use adapter::{ConfigAdapter, RawConfig, RawFormat};
pub use compiler::{CompiledConfig, ConfigCompiler};
pub use config::GatewaySettings;
pub use engine::{ActiveConfig, ServingEngine};
pub use error::{Error, Result};
pub use lifecycle::Shutdown;
pub use reload::ConfigLoader;
pub use source::{PluginFactory, SourceRegistry};
