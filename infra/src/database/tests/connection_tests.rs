//! Unit tests for the connection manager
//!
//! None of these need a running database: the pool connects lazily and the
//! unreachable cases point at a closed local port.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bd_shared::config::DatabaseConfig;

use crate::database::connection::{DatabaseManager, PoolStatistics};
use crate::database::lifecycle::DatabaseLifecycle;
use crate::DatabaseError;

/// Nothing listens on port 1; every connect attempt is refused
fn unreachable_config() -> DatabaseConfig {
    DatabaseConfig::new("bedrock_test", "app", "secret")
        .with_host("127.0.0.1", 1)
        .with_pool(1, 0)
        .with_pool_timeout(1)
        .with_echo(false, false)
}

#[test]
fn test_zero_pool_size_is_rejected() {
    let config = unreachable_config().with_pool(0, 5);

    let result = DatabaseManager::new(&config);
    assert!(matches!(result, Err(DatabaseError::Config(_))));
}

#[tokio::test]
async fn test_pool_sized_from_config() {
    let config = unreachable_config().with_pool(5, 10);
    let db = DatabaseManager::new(&config).unwrap();

    let stats = db.statistics();
    assert_eq!(stats.max_connections, 15);
    assert_eq!(stats.active_sessions, 0);
    assert!(!db.is_disposed());

    db.dispose().await;
}

#[tokio::test]
async fn test_echo_pool_logging_builds() {
    let config = unreachable_config().with_echo(true, true);
    let db = DatabaseManager::new(&config).unwrap();
    assert_eq!(db.statistics().max_connections, 1);
    db.dispose().await;
}

#[tokio::test]
async fn test_dispose_twice_is_safe() {
    let db = DatabaseManager::new(&unreachable_config()).unwrap();

    db.dispose().await;
    db.dispose().await;

    assert!(db.is_disposed());
    assert!(db.get_pool().is_closed());
}

#[tokio::test]
async fn test_dispose_after_cancelled_dispose_closes_pool() {
    let db = DatabaseManager::new(&unreachable_config()).unwrap();

    let _ = tokio::time::timeout(std::time::Duration::ZERO, db.dispose()).await;
    assert!(db.is_disposed());

    db.dispose().await;
    assert!(db.get_pool().is_closed());
}

#[tokio::test]
async fn test_acquire_after_dispose_fails() {
    let db = DatabaseManager::new(&unreachable_config()).unwrap();
    db.dispose().await;

    let result = db.acquire_session().await;
    assert!(matches!(result, Err(DatabaseError::Disposed)));
    assert!(matches!(db.health_check().await, Err(DatabaseError::Disposed)));
    assert_eq!(db.statistics().active_sessions, 0);
}

#[tokio::test]
async fn test_clones_share_disposal() {
    let db = DatabaseManager::new(&unreachable_config()).unwrap();
    let clone = db.clone();

    clone.dispose().await;
    assert!(db.is_disposed());
    assert!(matches!(db.acquire_session().await, Err(DatabaseError::Disposed)));
}

#[tokio::test]
async fn test_probe_unreachable_database_is_not_fatal() {
    let db = DatabaseManager::new(&unreachable_config()).unwrap();

    assert!(!db.probe_connectivity().await);

    // The pool is still usable for later attempts
    assert!(!db.is_disposed());
    db.dispose().await;
}

#[tokio::test]
async fn test_lifecycle_trait_delegates() {
    let db = DatabaseManager::new(&unreachable_config()).unwrap();
    let lifecycle: Arc<dyn DatabaseLifecycle> = Arc::new(db.clone());

    assert!(!lifecycle.probe_connectivity().await);
    lifecycle.dispose().await;
    lifecycle.dispose().await;
    assert!(db.is_disposed());
}

#[tokio::test]
async fn test_failed_acquire_releases_session_count() {
    let db = DatabaseManager::new(&unreachable_config()).unwrap();

    let result = db.acquire_session().await;
    assert!(result.is_err());
    assert_eq!(db.statistics().active_sessions, 0);

    db.dispose().await;
}

#[tokio::test]
async fn test_with_session_propagates_acquire_error() {
    let db = DatabaseManager::new(&unreachable_config()).unwrap();
    let ran = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&ran);
    let result = db
        .with_session(move |_session| {
            Box::pin(async move {
                flag.store(true, Ordering::SeqCst);
                Ok::<_, DatabaseError>(())
            })
        })
        .await;

    assert!(result.is_err());
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(db.statistics().active_sessions, 0);

    db.dispose().await;
}

#[tokio::test]
async fn test_cancelled_acquire_releases_session_count() {
    let config = unreachable_config().with_pool_timeout(30);
    let db = DatabaseManager::new(&config).unwrap();

    let attempt = tokio::time::timeout(
        std::time::Duration::from_millis(100),
        db.acquire_session(),
    )
    .await;

    assert!(attempt.is_err(), "acquire should still be waiting");
    assert_eq!(db.statistics().active_sessions, 0);
}

#[test]
fn test_pool_statistics_display() {
    let stats = PoolStatistics {
        connections: 5,
        idle_connections: 3,
        max_connections: 10,
        active_sessions: 2,
    };

    let display = format!("{}", stats);
    assert!(display.contains("5/10"));
    assert!(display.contains("3 idle"));
    assert!(display.contains("2 sessions"));
    assert_eq!(stats.in_use(), 2);
}

#[test]
fn test_pool_timeout_error_mapping() {
    assert!(matches!(
        DatabaseError::from(sqlx::Error::PoolTimedOut),
        DatabaseError::PoolTimeout
    ));
    assert!(matches!(
        DatabaseError::from(sqlx::Error::PoolClosed),
        DatabaseError::Disposed
    ));
    assert!(matches!(
        DatabaseError::from(sqlx::Error::RowNotFound),
        DatabaseError::Sqlx(_)
    ));
}
