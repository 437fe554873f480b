//! Liveness endpoint

use actix_web::{web, HttpResponse};

use bd_infra::DatabaseManager;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "bedrock-api";

/// GET {prefix}/health
///
/// Reports process liveness and a pool snapshot. Does not touch the database.
pub async fn health_check(db: web::Data<DatabaseManager>) -> HttpResponse {
    let stats = db.statistics();

    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "pool": {
            "connections": stats.connections,
            "idle": stats.idle_connections,
            "max": stats.max_connections,
            "sessions": stats.active_sessions,
            "disposed": db.is_disposed(),
        },
    }))
}
