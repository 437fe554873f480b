//! # Infrastructure Layer
//!
//! PostgreSQL plumbing for the Bedrock backend, built on SQLx:
//! - **Connection manager**: one pooled engine per process, sized from
//!   `pool_size` and `max_overflow`
//! - **Sessions**: scoped units of work that never auto-commit and always
//!   return their connection to the pool
//! - **Lifecycle**: startup connectivity probe and shutdown disposal
//! - **Schema setup**: executes the DDL rendered by `bd_core`

/// Database module - PostgreSQL implementations using SQLx
pub mod database;

pub use database::{
    DatabaseLifecycle, DatabaseManager, PoolStatistics, Session, SessionFuture,
};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Query or connection error reported by the driver
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),

    /// No connection became free within the pool timeout
    #[error("Timed out waiting for a pooled connection")]
    PoolTimeout,

    /// The manager was disposed; no further sessions can be acquired
    #[error("Database connection pool has been disposed")]
    Disposed,

    /// Pool options cannot be built from the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema DDL could not be rendered
    #[error("Schema error: {0}")]
    Schema(#[from] bd_core::SchemaError),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolTimeout,
            sqlx::Error::PoolClosed => DatabaseError::Disposed,
            other => DatabaseError::Sqlx(other),
        }
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
