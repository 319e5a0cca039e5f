use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::{required_str, Tool, ToolError, ToolKind, Workspace};

/// Write file tool - creates or overwrites a workspace file
pub struct WriteFileTool {
    workspace: Workspace,
}

impl WriteFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Create or overwrite a workspace file. Missing parent directories are created."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Workspace-relative path of the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "Full new content of the file"
                }
            },
            "required": ["path", "content"]
        })
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Edit
    }

    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let path = required_str(&args, "path")?;
        let content = required_str(&args, "content")?;
        let full = self.workspace.resolve(path).await?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, content).await?;

        debug!("wrote {} bytes to {}", content.len(), full.display());
        Ok(format!("Wrote {} bytes to {}", content.len(), path))
    }
}

/// Edit file tool - replaces one exact occurrence of a string in a workspace file
pub struct EditFileTool {
    workspace: Workspace,
}

impl EditFileTool {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Replace the single occurrence of old_string with new_string in a workspace file."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Workspace-relative path of the file to edit"
                },
                "old_string": {
                    "type": "string",
                    "description": "Text to replace; must occur exactly once"
                },
                "new_string": {
                    "type": "string",
                    "description": "Replacement text"
                }
            },
            "required": ["path", "old_string", "new_string"]
        })
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Edit
    }

    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let path = required_str(&args, "path")?;
        let old = required_str(&args, "old_string")?;
        let new = required_str(&args, "new_string")?;

        if old.is_empty() {
            return Err(ToolError::InvalidArguments("'old_string' must not be empty".to_string()));
        }

        let full = self.workspace.resolve(path).await?;
        let text = tokio::fs::read_to_string(&full).await?;

        match text.matches(old).count() {
            0 => Err(ToolError::ExecutionFailed(format!("old_string not found in {}", path))),
            1 => {
                tokio::fs::write(&full, text.replacen(old, new, 1)).await?;
                Ok(format!("Edited {}", path))
            }
            n => Err(ToolError::ExecutionFailed(format!(
                "old_string matches {} times in {}; include more context",
                n, path
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_creates_parents() {
        let dir = tempdir().unwrap();
        let tool = WriteFileTool::new(Workspace::new(dir.path()));

        let out = tool
            .execute(json!({ "path": "docs/guide.md", "content": "# Guide" }))
            .await
            .unwrap();
        assert_eq!(out, "Wrote 7 bytes to docs/guide.md");
        assert_eq!(std::fs::read_to_string(dir.path().join("docs/guide.md")).unwrap(), "# Guide");
    }

    #[tokio::test]
    async fn test_edit_replaces_single_match() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha beta gamma").unwrap();
        let tool = EditFileTool::new(Workspace::new(dir.path()));

        tool.execute(json!({ "path": "a.txt", "old_string": "beta", "new_string": "BETA" }))
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "alpha BETA gamma");
    }

    #[tokio::test]
    async fn test_edit_rejects_missing_and_ambiguous() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x x").unwrap();
        let tool = EditFileTool::new(Workspace::new(dir.path()));

        let missing = tool
            .execute(json!({ "path": "a.txt", "old_string": "y", "new_string": "z" }))
            .await
            .unwrap_err();
        assert!(missing.to_string().contains("not found"));

        let ambiguous = tool
            .execute(json!({ "path": "a.txt", "old_string": "x", "new_string": "z" }))
            .await
            .unwrap_err();
        assert!(ambiguous.to_string().contains("matches 2 times"));
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "x x");
    }
}
