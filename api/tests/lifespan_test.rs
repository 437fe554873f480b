//! Tests for the startup and shutdown hooks

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use bd_api::Lifespan;
use bd_infra::DatabaseLifecycle;

#[derive(Default)]
struct MockDatabase {
    reachable: AtomicBool,
    probes: AtomicUsize,
    disposals: AtomicUsize,
}

impl MockDatabase {
    fn new(reachable: bool) -> Arc<Self> {
        let mock = Self::default();
        mock.reachable.store(reachable, Ordering::SeqCst);
        Arc::new(mock)
    }
}

#[async_trait]
impl DatabaseLifecycle for MockDatabase {
    async fn probe_connectivity(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.reachable.load(Ordering::SeqCst)
    }

    async fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

#[actix_web::test]
async fn test_startup_probes_once() {
    let mock = MockDatabase::new(true);
    let lifespan = Lifespan::new(mock.clone());

    assert!(lifespan.startup().await);
    assert_eq!(mock.probes.load(Ordering::SeqCst), 1);
    assert_eq!(mock.disposals.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_unreachable_database_does_not_abort_startup() {
    let mock = MockDatabase::new(false);
    let lifespan = Lifespan::new(mock.clone());

    assert!(!lifespan.startup().await);

    // The process keeps running and still disposes at shutdown
    lifespan.shutdown().await;
    assert_eq!(mock.disposals.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn test_shutdown_disposes_exactly_once() {
    let mock = MockDatabase::new(true);
    let lifespan = Lifespan::new(mock.clone());

    lifespan.startup().await;
    lifespan.shutdown().await;

    assert_eq!(mock.probes.load(Ordering::SeqCst), 1);
    assert_eq!(mock.disposals.load(Ordering::SeqCst), 1);
}
