//! Shared configuration and error types for the Bedrock server
//!
//! This crate provides the pieces every other crate reads at startup:
//! - Typed configuration tree (`Settings`) and its environment loader
//! - Configuration error types

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    ApiConfig, DatabaseConfig, LogFormat, LoggingConfig, NamingConvention, RunConfig, Settings,
    SettingsLoader,
};
pub use errors::SettingsError;
