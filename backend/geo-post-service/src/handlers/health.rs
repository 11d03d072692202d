use actix_web::{web, HttpResponse};

use crate::services::SearchCoordinator;

/// Service and storage health
/// GET /api/v1/health
pub async fn health_check(coordinator: web::Data<SearchCoordinator>) -> HttpResponse {
    let database = coordinator.health().await;
    let healthy = database.is_healthy();
    let status = if healthy { "ok" } else { "unhealthy" };

    let body = serde_json::json!({
        "status": status,
        "service": "geo-post-service",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    });

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
