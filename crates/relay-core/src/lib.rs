//! Core domain types and error definitions for agent-relay.
//!
//! This crate provides the types shared by the agent client, the tool layer
//! and the HTTP server:
//!
//! - [`AgentError`]: Error type for agent invocations
//! - [`ResponseMessage`] and [`ContentBlock`]: The messages an agent emits
//! - [`AgentOptions`] and [`PermissionMode`]: Static agent configuration
//! - [`ToolSchema`] and [`ToolKind`]: Tool description for the model
//!
//! # Example
//!
//! ```rust
//! use relay_core::{AgentOptions, ContentBlock, PermissionMode, ToolKind};
//!
//! let options = AgentOptions::default();
//! assert_eq!(options.permission_mode, PermissionMode::AcceptEdits);
//! assert!(options.permission_mode.allows(ToolKind::Edit));
//!
//! let block: ContentBlock = serde_json::from_str(r#"{"type":"text","text":"hi"}"#).unwrap();
//! assert_eq!(block, ContentBlock::Text { text: "hi".into() });
//! ```

use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model used when no override is configured.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Instruction text sent as the system prompt when no override is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "你是一個友善的 AI 助手，請使用繁體中文回覆。";

/// Upper bound on model round-trips within one invocation.
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// Errors that can occur while invoking an agent.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Transport-level failure talking to the model API.
    #[error("LLM request failed: {0}")]
    LlmError(String),

    /// The model API answered with a non-success status.
    #[error("Anthropic API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The model API answered with a body we could not decode.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError(err.to_string())
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// How the agent may use tools that act on the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    /// Read-only tools run; edits would need an approval nobody can give.
    Default,
    /// File edits are approved automatically.
    #[default]
    AcceptEdits,
    /// Every tool runs without checks.
    BypassPermissions,
    /// Planning only: nothing that changes the workspace runs.
    Plan,
}

impl PermissionMode {
    /// Wire name of the mode, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::AcceptEdits => "acceptEdits",
            Self::BypassPermissions => "bypassPermissions",
            Self::Plan => "plan",
        }
    }

    /// Returns true if a tool of the given kind may run under this mode.
    pub fn allows(&self, kind: ToolKind) -> bool {
        match (self, kind) {
            (_, ToolKind::ReadOnly) => true,
            (Self::AcceptEdits | Self::BypassPermissions, ToolKind::Edit) => true,
            (Self::Default | Self::Plan, ToolKind::Edit) => false,
        }
    }
}

impl FromStr for PermissionMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "acceptEdits" => Ok(Self::AcceptEdits),
            "bypassPermissions" => Ok(Self::BypassPermissions),
            "plan" => Ok(Self::Plan),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static configuration for one agent invocation.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOptions {
    /// Model identifier sent to the API (e.g. "claude-sonnet-4-5").
    pub model: String,
    /// Fixed instruction text sent with every turn.
    pub system_prompt: String,
    /// Governs which tools may run.
    pub permission_mode: PermissionMode,
    /// Maximum number of model round-trips per invocation.
    pub max_turns: u32,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            permission_mode: PermissionMode::default(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

// ============================================================================
// Response Messages
// ============================================================================

fn is_false(value: &bool) -> bool {
    !*value
}

/// A block of message content, tagged by `type`.
///
/// The same shape is used on the Anthropic wire and in emitted messages.
/// Block types this crate does not know about decode to [`ContentBlock::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "is_false")]
        is_error: bool,
    },
    #[serde(other)]
    Other,
}

/// Token usage reported by the model API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
    }
}

/// A message emitted by an agent while it works on a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseMessage {
    /// Session metadata, emitted first.
    System(SystemMessage),
    /// One model turn.
    Assistant(AssistantMessage),
    /// Tool results fed back to the model.
    User(UserMessage),
    /// Final summary, emitted last.
    Result(ResultMessage),
}

/// Session metadata describing how the agent was started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub subtype: String,
    pub session_id: String,
    pub model: String,
    pub permission_mode: PermissionMode,
    pub cwd: String,
    pub tools: Vec<String>,
}

/// One model turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub session_id: String,
    pub message: AssistantPayload,
}

/// The model's reply for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantPayload {
    pub id: String,
    pub model: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

impl AssistantPayload {
    /// Concatenates the text blocks of this turn.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Tool results sent back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    pub session_id: String,
    pub content: Vec<ContentBlock>,
}

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSubtype {
    Success,
    ErrorMaxTurns,
}

/// Summary emitted once the agent stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMessage {
    pub subtype: ResultSubtype,
    pub session_id: String,
    pub num_turns: u32,
    pub duration_ms: u64,
    pub is_error: bool,
    pub result: Option<String>,
    pub usage: Usage,
}

// ============================================================================
// Tool Types
// ============================================================================

/// What a tool does to the workspace, for permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Only inspects the workspace.
    ReadOnly,
    /// Creates or modifies files.
    Edit,
}

/// JSON schema describing a tool for the model.
///
/// Serializes in the Anthropic `tools` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique name of the tool (e.g., "read_file").
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub input_schema: serde_json::Value,
}
