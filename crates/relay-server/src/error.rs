//! Request errors and their JSON responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_core::AgentError;
use serde::Serialize;
use tracing::error;

/// Everything a request can fail with.
///
/// The `Display` text is exactly what the client receives; agent failures
/// keep their detail only for the server log.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("Missing prompt parameter")]
    MissingPrompt,

    #[error("Internal server error")]
    Agent(#[from] AgentError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MissingPrompt => StatusCode::BAD_REQUEST,
            ApiError::Agent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Agent(e) = &self {
            error!("Chat failed: {}", e);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
