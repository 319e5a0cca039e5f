//! Tool-using agent over the Anthropic Messages API.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::stream;
use relay_core::{
    AgentError, AgentOptions, AssistantMessage, AssistantPayload, ContentBlock, ResponseMessage,
    ResultMessage, ResultSubtype, SystemMessage, ToolSchema, Usage, UserMessage,
};
use relay_tools::ToolRegistry;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AgentClient, MessageStream};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;

#[derive(Serialize, Clone)]
struct AnthropicMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

fn no_tools(tools: &&[ToolSchema]) -> bool {
    tools.is_empty()
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [AnthropicMessage],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolSchema],
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

/// Agent that answers prompts with Claude, calling workspace tools as needed.
///
/// Each [`AgentClient::query`] starts an independent session: an init
/// message, one assistant message per turn, a user message with tool
/// results after every tool-using turn, and a closing result message.
pub struct AnthropicAgent {
    client: Client,
    api_key: String,
    base_url: String,
    cwd: PathBuf,
    tools: Arc<ToolRegistry>,
}

impl AnthropicAgent {
    /// Creates an agent whose file tools are rooted at `cwd`.
    pub fn new(api_key: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into();
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
            tools: Arc::new(ToolRegistry::workspace(cwd.clone())),
            cwd,
        }
    }

    /// Points the agent at a different Messages API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replaces the default workspace tools.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Arc::new(tools);
        self
    }
}

impl AgentClient for AnthropicAgent {
    fn query(&self, prompt: &str, options: &AgentOptions) -> MessageStream {
        let session = Session::start(self, prompt, options);

        let messages = stream::try_unfold(session, |mut session| async move {
            let next = session.next_message().await?;
            Ok::<_, AgentError>(next.map(|message| (message, session)))
        });

        Box::pin(messages)
    }
}

/// State of one agent invocation.
struct Session {
    client: Client,
    api_key: String,
    endpoint: String,
    tools: Arc<ToolRegistry>,
    schemas: Vec<ToolSchema>,
    options: AgentOptions,
    session_id: String,
    history: Vec<AnthropicMessage>,
    pending: VecDeque<ResponseMessage>,
    turns: u32,
    usage: Usage,
    started: Instant,
    finished: bool,
}

impl Session {
    fn start(agent: &AnthropicAgent, prompt: &str, options: &AgentOptions) -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();

        let init = ResponseMessage::System(SystemMessage {
            subtype: "init".to_string(),
            session_id: session_id.clone(),
            model: options.model.clone(),
            permission_mode: options.permission_mode,
            cwd: agent.cwd.display().to_string(),
            tools: agent.tools.tool_names(),
        });

        Self {
            client: agent.client.clone(),
            api_key: agent.api_key.clone(),
            endpoint: format!("{}/v1/messages", agent.base_url.trim_end_matches('/')),
            tools: agent.tools.clone(),
            schemas: agent.tools.list(),
            options: options.clone(),
            session_id,
            history: vec![AnthropicMessage {
                role: "user",
                content: vec![ContentBlock::Text { text: prompt.to_string() }],
            }],
            pending: VecDeque::from([init]),
            turns: 0,
            usage: Usage::default(),
            started: Instant::now(),
            finished: false,
        }
    }

    /// Returns the next message, running turns until one is available.
    async fn next_message(&mut self) -> Result<Option<ResponseMessage>, AgentError> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Ok(Some(message));
            }
            if self.finished {
                return Ok(None);
            }
            self.run_turn().await?;
        }
    }

    async fn run_turn(&mut self) -> Result<(), AgentError> {
        let turn_start = Instant::now();
        let response = self.send().await?;
        self.turns += 1;
        self.usage += response.usage;

        info!(
            "Anthropic turn {}/{}: {}ms, tokens: {}/{}, stop: {}",
            self.turns,
            self.options.max_turns,
            turn_start.elapsed().as_millis(),
            response.usage.input_tokens,
            response.usage.output_tokens,
            response.stop_reason.as_deref().unwrap_or("none")
        );

        let calls: Vec<(String, String, serde_json::Value)> = response
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some((id.clone(), name.clone(), input.clone()))
                }
                _ => None,
            })
            .collect();
        let wants_tools = response.stop_reason.as_deref() == Some("tool_use") && !calls.is_empty();

        let payload = AssistantPayload {
            id: response.id,
            model: response.model,
            content: response.content,
            stop_reason: response.stop_reason,
            usage: response.usage,
        };
        let text = payload.text();

        self.history.push(AnthropicMessage {
            role: "assistant",
            content: payload
                .content
                .iter()
                .filter(|block| !matches!(block, ContentBlock::Other))
                .cloned()
                .collect(),
        });
        self.pending.push_back(ResponseMessage::Assistant(AssistantMessage {
            session_id: self.session_id.clone(),
            message: payload,
        }));

        if !wants_tools {
            self.finish(ResultSubtype::Success, Some(text));
            return Ok(());
        }

        if self.turns >= self.options.max_turns {
            warn!("Max turns ({}) reached", self.options.max_turns);
            self.finish(ResultSubtype::ErrorMaxTurns, None);
            return Ok(());
        }

        let results = self.run_tools(calls).await;
        self.history.push(AnthropicMessage {
            role: "user",
            content: results.clone(),
        });
        self.pending.push_back(ResponseMessage::User(UserMessage {
            session_id: self.session_id.clone(),
            content: results,
        }));

        Ok(())
    }

    /// Executes tool calls in order; failures become error results.
    async fn run_tools(
        &self,
        calls: Vec<(String, String, serde_json::Value)>,
    ) -> Vec<ContentBlock> {
        let mut results = Vec::with_capacity(calls.len());

        for (id, name, input) in calls {
            info!("  → Executing tool: {}", name);
            let block = match self.tools.run(&name, input, self.options.permission_mode).await {
                Ok(output) => {
                    info!("  ← Tool result: {} chars", output.len());
                    ContentBlock::ToolResult {
                        tool_use_id: id,
                        content: output,
                        is_error: false,
                    }
                }
                Err(e) => {
                    warn!("  ← Tool {} failed: {}", name, e);
                    ContentBlock::ToolResult {
                        tool_use_id: id,
                        content: e.to_string(),
                        is_error: true,
                    }
                }
            };
            results.push(block);
        }

        results
    }

    fn finish(&mut self, subtype: ResultSubtype, result: Option<String>) {
        self.pending.push_back(ResponseMessage::Result(ResultMessage {
            subtype,
            session_id: self.session_id.clone(),
            num_turns: self.turns,
            duration_ms: self.started.elapsed().as_millis() as u64,
            is_error: subtype != ResultSubtype::Success,
            result,
            usage: self.usage,
        }));
        self.finished = true;
    }

    async fn send(&self) -> Result<AnthropicResponse, AgentError> {
        let request = AnthropicRequest {
            model: &self.options.model,
            max_tokens: MAX_TOKENS,
            system: &self.options.system_prompt,
            messages: &self.history,
            tools: &self.schemas,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        Ok(serde_json::from_str(&body)?)
    }
}
