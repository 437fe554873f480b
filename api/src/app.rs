//! Application factory
//!
//! Builds the Actix-web application. Every request gets a tracing span; the
//! route tree is mounted under the configured prefix with a JSON 404 fallback.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use bd_infra::DatabaseManager;
use bd_shared::ApiConfig;

use crate::routes::health::health_check;

/// Create and configure the application
pub fn create_app(
    api: &ApiConfig,
    db: web::Data<DatabaseManager>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(db)
        .wrap(TracingLogger::default())
        .service(web::scope(mount_path(&api.prefix)).route("/health", web::get().to(health_check)))
        .default_service(web::route().to(not_found))
}

/// Scope path for a configured prefix; `/api/` and `/api` mount the same tree
pub fn mount_path(prefix: &str) -> &str {
    prefix.trim_end_matches('/')
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "not_found",
        "message": "The requested resource was not found"
    }))
}
