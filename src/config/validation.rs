//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the adapter name and its required parameters
//! - Check the debounce interval, log level and bind addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewaySettings → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::adapter::{FILE_ADAPTER, KUBERNETES_ADAPTER};
use crate::config::duration::{parse_duration, DurationError};
use crate::config::schema::GatewaySettings;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown adapter `{0}` (expected `file` or `k8s`)")]
    UnknownAdapter(String),

    #[error("the file adapter requires `config.path`")]
    MissingPath,

    #[error("config.debounce_interval: {0}")]
    DebounceInterval(DurationError),

    #[error("unknown log level `{0}`")]
    LogLevel(String),

    #[error("{field}: `{value}` is not a socket address")]
    Address { field: &'static str, value: String },
}

/// Validate settings, collecting every problem found.
pub fn validate_settings(settings: &GatewaySettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match settings.config.adapter.as_str() {
        FILE_ADAPTER => {
            if settings.config.path.trim().is_empty() {
                errors.push(ValidationError::MissingPath);
            }
        }
        KUBERNETES_ADAPTER => {}
        other => errors.push(ValidationError::UnknownAdapter(other.to_string())),
    }

    if let Err(e) = parse_duration(&settings.config.debounce_interval) {
        errors.push(ValidationError::DebounceInterval(e));
    }

    let level = settings.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(settings.logging.level.clone()));
    }

    if settings.observability.metrics_enabled
        && settings.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: settings.observability.metrics_address.clone(),
        });
    }

    if settings.admin.enabled && settings.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "admin.bind_address",
            value: settings.admin.bind_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
