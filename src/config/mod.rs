//! Process settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewaySettings (validated, immutable)
//!     → adapter selection, debounce interval, log level, endpoints
//! ```
//!
//! # Design Decisions
//! - Settings are read once at startup; the declared routing configuration is
//!   what hot-reloads, not these settings
//! - All fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;

pub use duration::parse_duration;
pub use loader::{load_settings, ConfigError};
pub use schema::{AdminConfig, ConfigSourceSettings, GatewaySettings, LoggingSettings, ObservabilityConfig};
