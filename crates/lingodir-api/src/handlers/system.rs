//! Health check and API description.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::{ApiDoc, AppState};

/// Liveness check. When a database is attached, it must answer a ping.
#[utoipa::path(get, path = "/health", tag = "System",
    responses(
        (status = 200, description = "Service healthy"),
        (status = 503, description = "Database unreachable")
    ))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, database) = match &state.db {
        None => (StatusCode::OK, "not configured"),
        Some(db) => {
            lingodir_db::log_pool_metrics(db.pool());
            match db.ping().await {
                Ok(()) => (StatusCode::OK, "ok"),
                Err(e) => {
                    tracing::warn!(subsystem = "api", error = %e, "Health check database ping failed");
                    (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
                }
            }
        }
    };

    let label = if status.is_success() { "healthy" } else { "degraded" };
    (
        status,
        Json(serde_json::json!({
            "status": label,
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
        })),
    )
}

/// OpenAPI document for this server.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
