//! Configuration error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling [`Settings`](crate::Settings).
///
/// Every variant is fatal for the process: nothing is served until the
/// configuration tree loads and validates.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An env file exists but could not be read or parsed
    #[error("Failed to read env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    /// A required field is missing or a value does not fit its type
    #[error("Configuration error: {0}")]
    Source(#[from] config::ConfigError),

    /// Values parsed but violate a semantic constraint
    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl SettingsError {
    /// Check if the error came from a missing or mistyped field
    pub fn is_source_error(&self) -> bool {
        matches!(self, SettingsError::Source(_))
    }

    /// Check if the error came from semantic validation
    pub fn is_validation_error(&self) -> bool {
        matches!(self, SettingsError::Validation(_))
    }
}
