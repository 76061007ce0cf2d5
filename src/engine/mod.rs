//! Serving-engine contract.
//!
//! # Data Flow
//! ```text
//! ConfigLoader
//!     → ServingEngine::load(payload, force_reload)
//!     → active.rs (decode → provision registry → publish snapshot)
//!     → readers (admin endpoint, request path) see old or new, never a mix
//! ```

use thiserror::Error;

pub mod active;

pub use active::{ActiveConfig, Snapshot};

/// Result of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The payload was activated as the given epoch.
    Applied { epoch: u64 },
    /// The payload matched the active one; nothing changed.
    Unchanged,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("payload is not a compiled configuration: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The component that serves traffic from a compiled configuration.
///
/// `load` either activates the whole payload or leaves the active
/// configuration untouched.
pub trait ServingEngine: Send + Sync {
    fn load(&self, payload: &[u8], force_reload: bool) -> Result<Activation, EngineError>;
}
