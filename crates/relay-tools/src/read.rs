use async_trait::async_trait;
use serde_json::json;

use crate::{required_str, Tool, ToolError, ToolKind, Workspace};

/// Longest file content returned to the model, in bytes.
const MAX_READ_BYTES: usize = 100_000;

/// Read file tool - returns the text content of a workspace file
pub struct ReadFileTool {
    workspace: Workspace,
}

impl ReadFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

/// Cuts `text` to at most `max` bytes on a char boundary.
fn truncate(mut text: String, max: usize) -> (String, bool) {
    if text.len() <= max {
        return (text, false);
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    (text, true)
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a UTF-8 text file from the workspace. Paths are relative to the workspace root."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Workspace-relative path of the file to read"
                }
            },
            "required": ["path"]
        })
    }

    fn kind(&self) -> ToolKind {
        ToolKind::ReadOnly
    }

    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let path = required_str(&args, "path")?;
        let full = self.workspace.resolve(path).await?;

        let text = tokio::fs::read_to_string(&full).await?;
        let (content, truncated) = truncate(text, MAX_READ_BYTES);

        if truncated {
            return Ok(format!("{}\n[truncated at {} bytes]", content, MAX_READ_BYTES));
        }
        Ok(content)
    }
}

/// List directory tool - names the entries of a workspace directory
pub struct ListDirectoryTool {
    workspace: Workspace,
}

impl ListDirectoryTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List the entries of a workspace directory. Directories are shown with a trailing slash."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Workspace-relative directory (default: workspace root)",
                    "default": "."
                }
            }
        })
    }

    fn kind(&self) -> ToolKind {
        ToolKind::ReadOnly
    }

    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or(".");
        let full = self.workspace.resolve(path).await?;

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&full).await?;
        while let Some(entry) = dir.next_entry().await? {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await?.is_dir() {
                name.push('/');
            }
            entries.push(name);
        }

        if entries.is_empty() {
            return Ok("(empty directory)".to_string());
        }
        entries.sort();
        Ok(entries.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_truncate_respects_char_boundary() {
        let (text, truncated) = truncate("你好".to_string(), 4);
        assert_eq!(text, "你");
        assert!(truncated);

        let (text, truncated) = truncate("short".to_string(), 10);
        assert_eq!(text, "short");
        assert!(!truncated);
    }

    #[tokio::test]
    async fn test_list_directory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("README.md"), "hi").unwrap();

        let tool = ListDirectoryTool::new(Workspace::new(dir.path()));
        let listing = tool.execute(json!({})).await.unwrap();
        assert_eq!(listing, "README.md\nsrc/");

        let empty = tool.execute(json!({ "path": "src" })).await.unwrap();
        assert_eq!(empty, "(empty directory)");
    }

    #[tokio::test]
    async fn test_read_file_errors() {
        let dir = tempdir().unwrap();
        let tool = ReadFileTool::new(Workspace::new(dir.path()));

        assert!(matches!(tool.execute(json!({})).await, Err(ToolError::InvalidArguments(_))));
        assert!(matches!(
            tool.execute(json!({ "path": "missing.txt" })).await,
            Err(ToolError::Io(_))
        ));
        assert!(matches!(
            tool.execute(json!({ "path": "../secret" })).await,
            Err(ToolError::OutsideWorkspace(_))
        ));
    }
}
