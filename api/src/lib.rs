//! Bedrock HTTP host
//!
//! Library exports for the binary and for testing.

pub mod app;
pub mod lifespan;
pub mod routes;
pub mod server;
pub mod telemetry;

pub use app::create_app;
pub use lifespan::Lifespan;
