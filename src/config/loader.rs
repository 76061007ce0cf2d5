//! Settings loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::duration::DurationError;
use crate::config::schema::GatewaySettings;
use crate::config::validation::{validate_settings, ValidationError};

/// Error type for settings loading and adapter selection.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("invalid adapter specified: `{0}`")]
    UnknownAdapter(String),

    #[error("invalid debounce interval: {0}")]
    DebounceInterval(#[from] DurationError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<GatewaySettings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let settings: GatewaySettings = toml::from_str(&content)?;

    validate_settings(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}
