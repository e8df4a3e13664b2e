use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use service_core::error::AppError;

pub const SERVER_NAME: &str = "Houzou Medical Notification Server";

/// `GET /` banner.
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": SERVER_NAME,
        "status": "running",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }))
}

/// Liveness probe; reports the push provider's configuration health.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.push_provider.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "notification-server",
                "provider": state.push_provider.name(),
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "notification-server",
                "error": e.to_string()
            })),
        ),
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Route not found"))
}
