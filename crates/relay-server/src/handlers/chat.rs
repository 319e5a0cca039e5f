//! Chat handler: runs a prompt through the agent and returns the full reply.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use tracing::info;

use crate::dto::ChatResponse;
use crate::error::ApiError;
use crate::services;
use crate::ServerState;

/// Returns the first `prompt` value, if it is present and non-empty.
fn first_prompt(pairs: Vec<(String, String)>) -> Option<String> {
    pairs
        .into_iter()
        .find(|(key, _)| key == "prompt")
        .map(|(_, value)| value)
        .filter(|prompt| !prompt.is_empty())
}

/// Answers `GET /chat?prompt=...` once the agent has finished.
pub async fn chat(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let prompt = query
        .ok()
        .and_then(|Query(pairs)| first_prompt(pairs))
        .ok_or(ApiError::MissingPrompt)?;

    info!("[Chat] {}", prompt);

    let response = services::chat::execute_chat(&state, &prompt).await?;

    Ok(Json(ChatResponse { prompt, response }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_prompt_wins() {
        let query = pairs(&[("lang", "zh"), ("prompt", "a"), ("prompt", "b")]);
        assert_eq!(first_prompt(query).as_deref(), Some("a"));
    }

    #[test]
    fn test_first_prompt_empty_or_absent() {
        assert_eq!(first_prompt(pairs(&[("prompt", ""), ("prompt", "b")])), None);
        assert_eq!(first_prompt(pairs(&[("other", "1")])), None);
        assert_eq!(first_prompt(Vec::new()), None);
    }
}
