//! Top-level error type for the control plane.

use thiserror::Error;

use crate::adapter::AdapterError;
use crate::compiler::CompileError;
use crate::config::ConfigError;
use crate::engine::EngineError;

#[derive(Debug, Error)]
pub enum Error {
    /// Process settings could not be loaded or are invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// The serving engine rejected a payload
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `watch` was called before `initialize` succeeded
    #[error("config loader is not initialized")]
    NotInitialized,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, Error>;
