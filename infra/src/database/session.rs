//! Scoped database sessions
//!
//! A [`Session`] is one unit of work. It opens a transaction on a pooled
//! connection when acquired and never commits on its own: work is persisted
//! only by an explicit [`Session::commit`].
//!
//! How a dropped session gives its connection back depends on whether a
//! statement may still be running on it:
//! - settled (nothing run yet, or the [`with_session`] scope finished): the
//!   rollback is queued and the connection goes back to the pool
//! - possibly in flight (the owning future was cancelled, the scope panicked,
//!   or a session from [`acquire_session`] was used and dropped without
//!   `commit`/`rollback`): the connection is closed and its pool slot freed at
//!   once, so the next checkout never waits for a statement nobody reads
//!
//! [`with_session`]: super::DatabaseManager::with_session
//! [`acquire_session`]: super::DatabaseManager::acquire_session

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgTransactionManager;
use sqlx::{PgConnection, PgPool, Postgres, TransactionManager};

use crate::DatabaseResult;

/// Future returned by closures passed to
/// [`DatabaseManager::with_session`](super::DatabaseManager::with_session)
pub type SessionFuture<'s, T, E> = BoxFuture<'s, Result<T, E>>;

/// One unit of work borrowed from the pool
///
/// Owned by a single task; all access goes through `&mut self`.
pub struct Session {
    pool: PgPool,
    /// Connection holding the open transaction
    conn: Option<PoolConnection<Postgres>>,
    /// Set once the connection has been handed out, cleared when settled
    in_flight: bool,
    _guard: SessionGuard,
}

impl Session {
    pub(crate) async fn begin(pool: &PgPool, guard: SessionGuard) -> DatabaseResult<Self> {
        let conn = open_transaction(pool).await?;
        tracing::trace!("Session acquired");

        Ok(Self {
            pool: pool.clone(),
            conn: Some(conn),
            in_flight: false,
            _guard: guard,
        })
    }

    /// Connection to run queries on, inside the session's transaction
    ///
    /// After a commit or rollback the next call opens a new transaction on a
    /// freshly checked-out connection.
    pub async fn connection(&mut self) -> DatabaseResult<&mut PgConnection> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => open_transaction(&self.pool).await?,
        };
        self.in_flight = true;
        Ok(&mut **self.conn.insert(conn))
    }

    /// Commit the open transaction, if any, and release its connection
    ///
    /// Values already read stay as they are; nothing is refreshed.
    pub async fn commit(&mut self) -> DatabaseResult<()> {
        if let Some(conn) = self.conn.as_mut() {
            self.in_flight = true;
            PgTransactionManager::commit(&mut **conn).await?;
            self.release();
            tracing::trace!("Session committed");
        }
        Ok(())
    }

    /// Roll back the open transaction, if any, and release its connection
    pub async fn rollback(&mut self) -> DatabaseResult<()> {
        if let Some(conn) = self.conn.as_mut() {
            self.in_flight = true;
            PgTransactionManager::rollback(&mut **conn).await?;
            self.release();
            tracing::trace!("Session rolled back");
        }
        Ok(())
    }

    /// True while a transaction is open and holding a connection
    pub fn in_transaction(&self) -> bool {
        self.conn.is_some()
    }

    /// Mark every statement run so far as finished
    pub(crate) fn settle(&mut self) {
        self.in_flight = false;
    }

    fn release(&mut self) {
        self.conn = None;
        self.in_flight = false;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };

        if self.in_flight {
            tracing::debug!(
                "Session dropped with a statement possibly in flight; closing its connection"
            );
            drop(conn.detach());
        } else {
            tracing::trace!("Session released with uncommitted work; rolling back");
            PgTransactionManager::start_rollback(&mut *conn);
        }
    }
}

async fn open_transaction(pool: &PgPool) -> DatabaseResult<PoolConnection<Postgres>> {
    let mut conn = pool.acquire().await?;
    PgTransactionManager::begin(&mut *conn).await?;
    Ok(conn)
}

/// Counts sessions that are being acquired or are alive
///
/// The count is taken before the pool is touched and given back on drop, so
/// failed acquisitions and cancelled scopes leave it unchanged.
#[derive(Debug)]
pub(crate) struct SessionGuard {
    counter: Arc<AtomicUsize>,
}

impl SessionGuard {
    pub(crate) fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
