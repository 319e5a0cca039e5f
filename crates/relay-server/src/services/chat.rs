//! Chat execution service.

use std::time::Instant;

use relay_core::AgentError;
use tracing::info;

use crate::ServerState;

/// Runs one prompt through the configured agent and returns its text.
pub async fn execute_chat(state: &ServerState, prompt: &str) -> Result<String, AgentError> {
    let start = Instant::now();
    let reply = relay_agent::chat(state.agent.as_ref(), prompt, &state.options).await?;

    info!(
        "Chat reply: {} chars in {}ms",
        reply.chars().count(),
        start.elapsed().as_millis()
    );
    Ok(reply)
}
