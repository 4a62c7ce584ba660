//! Health Check API Handlers

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// GET /
pub async fn welcome() -> impl IntoResponse {
    Json(json!({"message": "Welcome to the API"}))
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
