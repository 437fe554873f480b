//! Process wiring: connection manager, lifecycle hooks and the HTTP server

use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::{Context, Result};

use bd_infra::DatabaseManager;
use bd_shared::Settings;

use crate::app::create_app;
use crate::lifespan::Lifespan;

/// Serve until the server is stopped, then dispose the pool
///
/// Must run inside the Actix system runtime.
pub async fn run(settings: Settings) -> Result<()> {
    let db = DatabaseManager::new(&settings.db).context("Failed to create database manager")?;
    let lifespan = Lifespan::new(Arc::new(db.clone()));

    lifespan.startup().await;

    let outcome = serve(&settings, db).await;

    lifespan.shutdown().await;
    outcome
}

async fn serve(settings: &Settings, db: DatabaseManager) -> Result<()> {
    let bind_address = settings.run.bind_address();
    tracing::info!(
        "Starting HTTP server on {} (prefix: {})",
        bind_address,
        settings.api.prefix
    );

    let api = settings.api.clone();
    let db = web::Data::new(db);
    let mut server = HttpServer::new(move || create_app(&api, db.clone()));
    if settings.run.workers > 0 {
        server = server.workers(settings.run.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("HTTP server error")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
