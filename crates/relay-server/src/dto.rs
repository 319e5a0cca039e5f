//! Data transfer objects for HTTP message serialization.

use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Body of a successful `GET /chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub prompt: String,
    pub response: String,
}
