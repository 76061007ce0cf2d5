//! Hot-reload subsystem.
//!
//! # Data Flow
//! ```text
//! ConfigAdapter::run (one RawConfig per change)
//!     → loader.rs (watch loop, cancellable)
//!     → debounce.rs (last payload of a burst, after a quiet period)
//!     → ConfigCompiler::compile → ServingEngine::load
//! ```
//!
//! # Design Decisions
//! - A failed reload is logged and skipped; the active configuration stays
//! - The initial load is fatal on failure
//! - Cancellation drops a pending reload instead of draining it

pub mod debounce;
pub mod loader;

pub use debounce::{DebounceState, Debouncer};
pub use loader::{ConfigLoader, LoaderState};
