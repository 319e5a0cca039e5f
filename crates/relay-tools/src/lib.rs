//! Tool registry and workspace tools for agent-relay.
//!
//! This crate provides the tools an agent can call while answering a prompt:
//!
//! - [`Tool`]: Trait for implementing tools
//! - [`ToolRegistry`]: Registry that looks tools up and enforces permissions
//! - [`Workspace`]: Root directory every file tool is confined to
//! - [`ReadFileTool`], [`ListDirectoryTool`]: Read-only tools
//! - [`WriteFileTool`], [`EditFileTool`]: Edit tools
//!
//! # Using the Registry
//!
//! ```rust,ignore
//! use relay_tools::ToolRegistry;
//! use relay_core::PermissionMode;
//!
//! let registry = ToolRegistry::workspace("/srv/project");
//! let listing = registry
//!     .run("list_directory", serde_json::json!({}), PermissionMode::Default)
//!     .await?;
//! ```

mod edit;
mod read;
mod workspace;

pub use edit::{EditFileTool, WriteFileTool};
pub use read::{ListDirectoryTool, ReadFileTool};
pub use workspace::Workspace;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use relay_core::{PermissionMode, ToolKind, ToolSchema};

/// Errors that can occur during tool execution.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool execution failed with a message.
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    /// Invalid arguments were passed to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A path argument points outside the workspace.
    #[error("Path is outside the workspace: {0}")]
    OutsideWorkspace(String),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested tool was not found in the registry.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The permission mode does not allow this tool.
    #[error("Permission to use {tool} was denied in {mode} mode")]
    PermissionDenied { tool: String, mode: PermissionMode },
}

/// Trait for implementing tools that can be called by the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a description of what this tool does.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for this tool's parameters.
    fn parameters(&self) -> serde_json::Value;

    /// Returns whether this tool modifies the workspace.
    fn kind(&self) -> ToolKind;

    /// Executes the tool with the given arguments.
    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError>;

    /// Generates the schema for this tool (default implementation).
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters(),
        }
    }
}

/// Extracts a required string argument.
pub(crate) fn required_str<'a>(
    args: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{}' parameter", key)))
}

/// Registry of tools available to the agent.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Creates a registry with the file tools rooted at `root`.
    pub fn workspace(root: impl Into<PathBuf>) -> Self {
        let workspace = Workspace::new(root);
        let mut registry = Self::new();

        registry.register(ReadFileTool::new(workspace.clone()));
        registry.register(ListDirectoryTool::new(workspace.clone()));
        registry.register(WriteFileTool::new(workspace.clone()));
        registry.register(EditFileTool::new(workspace));

        registry
    }

    /// Registers a tool in the registry.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    /// Gets a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Returns schemas for all registered tools, ordered by name.
    pub fn list(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Returns the names of all registered tools, ordered.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Looks up a tool, checks it against the permission mode and runs it.
    pub async fn run(
        &self,
        name: &str,
        args: serde_json::Value,
        mode: PermissionMode,
    ) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        if !mode.allows(tool.kind()) {
            return Err(ToolError::PermissionDenied {
                tool: name.to_string(),
                mode,
            });
        }

        tool.execute(args).await
    }
}
