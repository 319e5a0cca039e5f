//! HTTP route handlers for the relay server.

pub mod chat;

use axum::Json;

use crate::dto::HealthResponse;
use crate::error::ApiError;

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Fallback for every unmatched path.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
