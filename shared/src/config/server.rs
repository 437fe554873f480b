//! Server configuration module

use serde::Deserialize;
use validator::Validate;

/// HTTP server bind configuration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RunConfig {
    /// Server host address
    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0, // Use all CPU cores
        }
    }
}

impl RunConfig {
    /// Create a new run configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Route tree mount point
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Path prefix every API route is mounted under
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

fn default_port() -> u16 {
    8000
}

fn default_prefix() -> String {
    String::from("/api")
}
