//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Settings → Metrics → Engine → Initial load (fatal) → Admin → Watch loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Cancel token → Watch loop, debouncer and admin stop
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: nothing listens until the first configuration is active
//! - One cancellation token fans out to every background task
//! - No drain: a reload pending at shutdown is dropped

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
