//! Configuration module with one sub-module per group
//!
//! - `database` - Database credentials, pool sizing and naming convention
//! - `loader` - Environment and env-file loading
//! - `logging` - Log level and output format
//! - `server` - HTTP bind address and API prefix

pub mod database;
pub mod loader;
pub mod logging;
pub mod server;

use serde::Deserialize;
use validator::Validate;

// Re-export commonly used types
pub use database::{DatabaseConfig, NamingConvention};
pub use loader::{SettingsLoader, ENV_NESTED_DELIMITER};
pub use logging::{LogFormat, LoggingConfig};
pub use server::{ApiConfig, RunConfig};

use crate::errors::SettingsError;

/// Complete application configuration
///
/// Built once at process start and passed by reference into every
/// component constructor. There is no global instance.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// HTTP bind configuration (`RUN__*`)
    #[serde(default)]
    #[validate(nested)]
    pub run: RunConfig,

    /// Route tree prefix (`API__*`)
    #[serde(default)]
    pub api: ApiConfig,

    /// Database configuration (`DB__*`), required
    #[validate(nested)]
    pub db: DatabaseConfig,

    /// Logging configuration (`LOG__*`)
    #[serde(default)]
    pub log: LoggingConfig,
}

impl Settings {
    /// Load from `.env.template`, then `.env`, then the process environment
    ///
    /// Both files are looked up in the working directory and are optional.
    pub fn from_env() -> Result<Self, SettingsError> {
        SettingsLoader::new().with_default_env_files(".").load()
    }
}
