//! Process lifecycle hooks for the database layer.

use async_trait::async_trait;

use super::connection::DatabaseManager;

/// Hooks the application runs at startup and shutdown
///
/// Implemented by [`DatabaseManager`]; the application host depends on this
/// trait so the lifecycle can be exercised without a database.
#[async_trait]
pub trait DatabaseLifecycle: Send + Sync {
    /// Startup diagnostic; logs and reports the outcome, never fails
    async fn probe_connectivity(&self) -> bool;

    /// Close every pooled connection; safe to call more than once
    async fn dispose(&self);
}

#[async_trait]
impl DatabaseLifecycle for DatabaseManager {
    async fn probe_connectivity(&self) -> bool {
        DatabaseManager::probe_connectivity(self).await
    }

    async fn dispose(&self) {
        DatabaseManager::dispose(self).await
    }
}
