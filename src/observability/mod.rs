//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! adapter / reload / engine / source registry produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (reload outcomes, active epoch, registry counters)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or the configured level)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
