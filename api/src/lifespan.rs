//! Startup and shutdown hooks around the HTTP server

use std::sync::Arc;

use bd_infra::DatabaseLifecycle;

/// Runs the database lifecycle hooks once per process
///
/// `shutdown` consumes the value, so the pool is disposed at most once through
/// it.
pub struct Lifespan {
    database: Arc<dyn DatabaseLifecycle>,
}

impl Lifespan {
    pub fn new(database: Arc<dyn DatabaseLifecycle>) -> Self {
        Self { database }
    }

    /// Probe the database before serving
    ///
    /// A failed probe is logged and reported but does not stop startup.
    pub async fn startup(&self) -> bool {
        tracing::info!("Running startup hooks");
        let reachable = self.database.probe_connectivity().await;
        if !reachable {
            tracing::warn!("Starting without a reachable database");
        }
        reachable
    }

    /// Dispose the connection pool after the server has stopped
    pub async fn shutdown(self) {
        tracing::info!("Running shutdown hooks");
        self.database.dispose().await;
    }
}
