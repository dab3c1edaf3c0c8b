//! Health check handler.

use crate::types::HealthResponse;
use axum::response::IntoResponse;
use axum::Json;

/// `GET /health`.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}
