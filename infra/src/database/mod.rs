//! Database module - PostgreSQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management
//! - Scoped sessions with explicit commit
//! - Startup probe and shutdown disposal
//! - Schema setup

pub mod connection;
pub mod lifecycle;
pub mod session;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::{DatabaseManager, PoolStatistics};
pub use lifecycle::DatabaseLifecycle;
pub use session::{Session, SessionFuture};
