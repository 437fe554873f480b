//! Database connection pool management
//!
//! This module provides connection pooling using SQLx with PostgreSQL. One
//! [`DatabaseManager`] is built per process from the database configuration;
//! it hands out scoped sessions, probes connectivity at startup and closes
//! every pooled connection at shutdown.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::LevelFilter;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool, Row};

use bd_core::Schema;
use bd_shared::config::DatabaseConfig;

use super::session::{Session, SessionFuture, SessionGuard};
use crate::{DatabaseError, DatabaseResult};

/// Statements slower than this are logged at warn level when echo is on
const SLOW_STATEMENT_THRESHOLD: Duration = Duration::from_secs(1);

/// Pooled PostgreSQL engine plus session factory
///
/// Cloning is cheap; clones share the same pool and disposal state.
#[derive(Clone)]
pub struct DatabaseManager {
    /// SQLx PostgreSQL connection pool
    pool: PgPool,
    /// Set once `dispose` has run
    disposed: Arc<AtomicBool>,
    /// Sessions currently being acquired or alive
    sessions: Arc<AtomicUsize>,
    /// Longest `dispose` waits for checked-out connections
    close_timeout: Duration,
}

impl DatabaseManager {
    /// Create the connection manager
    ///
    /// The pool keeps `pool_size` connections in steady state and opens up to
    /// `max_overflow` more under load; connections above `pool_size` are
    /// closed after `idle_timeout`. Checkout waits at most `pool_timeout`.
    ///
    /// Connections are opened lazily, so this never touches the network.
    /// Must be called from within a Tokio runtime.
    ///
    /// # Example
    /// ```no_run
    /// use bd_infra::DatabaseManager;
    /// use bd_shared::config::DatabaseConfig;
    ///
    /// # async fn run() -> Result<(), bd_infra::DatabaseError> {
    /// let config = DatabaseConfig::new("shop", "app", "secret");
    /// let db = DatabaseManager::new(&config)?;
    /// db.probe_connectivity().await;
    /// db.dispose().await;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &DatabaseConfig) -> DatabaseResult<Self> {
        if config.pool_size == 0 {
            return Err(DatabaseError::Config(
                "pool_size must be at least 1".to_string(),
            ));
        }

        tracing::info!(
            "Creating database connection pool for {} (pool_size: {}, max_overflow: {})",
            config.redacted_url(),
            config.pool_size,
            config.max_overflow
        );

        let mut connect_options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        // Statement logging follows the echo flag
        connect_options = if config.echo {
            connect_options
                .log_statements(LevelFilter::Info)
                .log_slow_statements(LevelFilter::Warn, SLOW_STATEMENT_THRESHOLD)
        } else {
            connect_options.disable_statement_logging()
        };

        let mut pool_options = PgPoolOptions::new()
            // Steady state plus overflow
            .min_connections(config.pool_size)
            .max_connections(config.max_connections())
            // Connection lifecycle
            .acquire_timeout(Duration::from_secs(config.pool_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .test_before_acquire(true);

        if config.echo_pool {
            pool_options = with_pool_logging(pool_options);
        }

        let pool = pool_options.connect_lazy_with(connect_options);

        Ok(Self {
            pool,
            disposed: Arc::new(AtomicBool::new(false)),
            sessions: Arc::new(AtomicUsize::new(0)),
            close_timeout: Duration::from_secs(config.pool_timeout),
        })
    }

    /// Get a reference to the underlying SQLx pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Acquire one session
    ///
    /// Waits for a free connection when the pool is exhausted, up to the pool
    /// timeout. No retry is attempted; failures surface as errors.
    ///
    /// End the session with [`Session::commit`] or [`Session::rollback`] to
    /// hand its connection back for reuse. A session dropped after
    /// [`Session::connection`] without either is treated as possibly having a
    /// statement in flight, and its connection is closed instead.
    pub async fn acquire_session(&self) -> DatabaseResult<Session> {
        let guard = SessionGuard::new(&self.sessions);
        self.ensure_open()?;
        Session::begin(&self.pool, guard).await
    }

    /// Run `f` with a session and release it afterwards
    ///
    /// The session is released on every exit path: when `f` succeeds, when it
    /// fails and when the returned future is dropped mid-way. Nothing is
    /// committed unless `f` calls [`Session::commit`].
    ///
    /// Once `f` has finished, an uncommitted transaction is rolled back and the
    /// connection returns to the pool. If the future is dropped while `f` is
    /// still running, the connection is closed and its slot freed immediately,
    /// without waiting for the server to finish the interrupted statement.
    ///
    /// ```no_run
    /// # use bd_infra::{DatabaseManager, DatabaseError};
    /// # async fn run(db: &DatabaseManager) -> Result<i64, DatabaseError> {
    /// let count = db
    ///     .with_session(|session| {
    ///         Box::pin(async move {
    ///             let (count,): (i64,) = sqlx::query_as("SELECT count(*) FROM orders")
    ///                 .fetch_one(session.connection().await?)
    ///                 .await?;
    ///             Ok::<_, DatabaseError>(count)
    ///         })
    ///     })
    ///     .await?;
    /// # Ok(count)
    /// # }
    /// ```
    pub async fn with_session<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut Session) -> SessionFuture<'s, T, E>,
        E: From<DatabaseError>,
    {
        let mut session = self.acquire_session().await?;
        let result = f(&mut session).await;
        session.settle();
        drop(session);
        result
    }

    /// Check if the database connection is healthy
    ///
    /// Performs a `SELECT 1` round-trip.
    pub async fn health_check(&self) -> DatabaseResult<bool> {
        self.ensure_open()?;
        tracing::debug!("Performing database health check");

        let row = sqlx::query("SELECT 1").fetch_one(&self.pool).await.map_err(|e| {
            tracing::error!("Database health check failed: {}", e);
            DatabaseError::from(e)
        })?;

        let value: i32 = row.try_get(0)?;
        if value == 1 {
            tracing::debug!("Database health check passed");
            Ok(true)
        } else {
            tracing::warn!("Database health check returned unexpected value: {}", value);
            Ok(false)
        }
    }

    /// Startup diagnostic: report whether the database answers
    ///
    /// Never fails; the outcome is logged and returned.
    pub async fn probe_connectivity(&self) -> bool {
        match self.health_check().await {
            Ok(true) => {
                tracing::info!("Database connection successful, result: 1");
                true
            }
            Ok(false) => {
                tracing::warn!("Database connection returned an unexpected result");
                false
            }
            Err(e) => {
                tracing::error!("Database connection failed: {}", e);
                false
            }
        }
    }

    /// Close all connections in the pool
    ///
    /// Idempotent. Idle connections are closed at once; checked-out ones are
    /// waited for up to the pool timeout. Connections still held after that
    /// are closed when their session ends instead of returning to the pool.
    /// Acquisition fails afterwards.
    pub async fn dispose(&self) {
        let first = !self.disposed.swap(true, Ordering::SeqCst);
        if first {
            tracing::info!("Closing database connection pool");
        } else {
            tracing::debug!("Database connection pool already disposed");
        }

        match tokio::time::timeout(self.close_timeout, self.pool.close()).await {
            Ok(()) if first => tracing::info!("Database connection pool closed"),
            Ok(()) => {}
            Err(_) => tracing::warn!(
                "Gave up waiting for {} checked-out connections after {:?}; \
                 they close when released",
                self.statistics().in_use(),
                self.close_timeout
            ),
        }
    }

    /// True once `dispose` has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Get connection pool statistics
    pub fn statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
            active_sessions: self.sessions.load(Ordering::SeqCst),
        }
    }

    /// Create every table of `schema` in one transaction
    pub async fn apply_schema(&self, schema: &Schema) -> DatabaseResult<()> {
        let statements = schema.statements()?;
        tracing::info!(
            "Applying schema: {} tables, {} statements",
            schema.tables().len(),
            statements.len()
        );

        let mut session = self.acquire_session().await?;
        for statement in &statements {
            sqlx::query(statement.as_str())
                .execute(session.connection().await?)
                .await?;
        }
        session.commit().await?;

        tracing::info!("Schema applied");
        Ok(())
    }

    fn ensure_open(&self) -> DatabaseResult<()> {
        if self.is_disposed() {
            Err(DatabaseError::Disposed)
        } else {
            Ok(())
        }
    }
}

/// Log connect, checkout and checkin events
fn with_pool_logging(options: PgPoolOptions) -> PgPoolOptions {
    options
        .after_connect(|_conn, _meta| {
            Box::pin(async move {
                tracing::debug!(target: "bd_infra::pool", "Connection opened");
                Ok(())
            })
        })
        .before_acquire(|_conn, meta| {
            Box::pin(async move {
                tracing::debug!(
                    target: "bd_infra::pool",
                    "Connection checked out (age: {:?}, idle for: {:?})",
                    meta.age,
                    meta.idle_for
                );
                Ok(true)
            })
        })
        .after_release(|_conn, meta| {
            Box::pin(async move {
                tracing::debug!(
                    target: "bd_infra::pool",
                    "Connection checked in (age: {:?})",
                    meta.age
                );
                Ok(true)
            })
        })
}

/// Connection pool statistics
#[derive(Debug, Clone)]
pub struct PoolStatistics {
    /// Total number of connections in the pool
    pub connections: u32,
    /// Number of idle connections
    pub idle_connections: usize,
    /// Maximum allowed connections
    pub max_connections: u32,
    /// Sessions being acquired or alive
    pub active_sessions: usize,
}

impl PoolStatistics {
    /// Connections currently checked out
    pub fn in_use(&self) -> usize {
        (self.connections as usize).saturating_sub(self.idle_connections)
    }
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} connections ({} idle, {} sessions)",
            self.connections, self.max_connections, self.idle_connections, self.active_sessions
        )
    }
}
