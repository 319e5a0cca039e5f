use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::ToolError;

/// Directory the file tools operate in.
///
/// Paths handed to tools are relative to the root. Absolute paths and `..`
/// components are rejected outright, and the deepest existing part of the
/// target is canonicalized so a symlink cannot lead outside the root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a workspace-relative path to a filesystem path under the
    /// canonical root.
    pub async fn resolve(&self, relative: &str) -> Result<PathBuf, ToolError> {
        let path = Path::new(relative);
        let confined = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if !confined {
            return Err(ToolError::OutsideWorkspace(relative.to_string()));
        }

        let root = tokio::fs::canonicalize(&self.root).await?;
        let target = root.join(path);

        // The root itself always exists, so this finds an ancestor.
        for ancestor in target.ancestors() {
            match tokio::fs::symlink_metadata(ancestor).await {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }

            // A dangling link fails to canonicalize; refuse to write through it.
            let real = match tokio::fs::canonicalize(ancestor).await {
                Ok(real) => real,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(ToolError::OutsideWorkspace(relative.to_string()))
                }
                Err(e) => return Err(e.into()),
            };

            if !real.starts_with(&root) {
                return Err(ToolError::OutsideWorkspace(relative.to_string()));
            }
            break;
        }

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_resolve_relative() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let ws = Workspace::new(dir.path());

        assert_eq!(ws.resolve("src/main.rs").await.unwrap(), root.join("src/main.rs"));
        assert_eq!(ws.resolve(".").await.unwrap(), root);
    }

    #[tokio::test]
    async fn test_resolve_rejects_escapes() {
        let dir = tempdir().unwrap();
        let ws = Workspace::new(dir.path());

        for path in ["../etc/passwd", "src/../../x", "/etc/passwd"] {
            assert!(matches!(
                ws.resolve(path).await,
                Err(ToolError::OutsideWorkspace(_))
            ));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_rejects_symlinks_out_of_root() {
        let outside = tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "TOPSECRET").unwrap();

        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("gone.txt"),
            dir.path().join("dangling"),
        )
        .unwrap();
        let ws = Workspace::new(dir.path());

        for path in ["link", "link/secret.txt", "link/new/file.txt", "dangling"] {
            assert!(
                matches!(ws.resolve(path).await, Err(ToolError::OutsideWorkspace(_))),
                "{path} should be rejected"
            );
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_allows_symlinks_inside_root() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();
        let ws = Workspace::new(dir.path());

        assert!(ws.resolve("alias/notes.txt").await.is_ok());
    }
}
