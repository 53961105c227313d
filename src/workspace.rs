//! Disposable workspace for the sparse-checkout strategy.

use std::path::Path;

use tempfile::TempDir;

use crate::error::Result;

/// An ephemeral directory holding the throwaway repository one
/// sparse-checkout download drives.
///
/// The directory is created fresh for each invocation, owned exclusively
/// by it, and removed when the value drops — on success and on every
/// failure path alike. Nothing is ever reused across invocations.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("gitpluck-").tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_workspace_exists_while_held() {
        let workspace = Workspace::new().unwrap();
        assert!(workspace.path().is_dir());
        let name = workspace
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert!(name.starts_with("gitpluck-"));
    }

    #[test]
    fn test_workspace_removed_on_drop() {
        let workspace = Workspace::new().unwrap();
        let path = workspace.path().to_path_buf();
        fs::write(path.join("marker"), b"contents").unwrap();
        drop(workspace);
        assert!(!path.exists());
    }

    #[test]
    fn test_workspace_removed_when_function_errors_out() {
        // Mimics a protocol step failing partway through: the early return
        // drops the workspace, which must still clean up.
        fn doomed(path_out: &mut std::path::PathBuf) -> Result<()> {
            let workspace = Workspace::new()?;
            *path_out = workspace.path().to_path_buf();
            fs::create_dir_all(workspace.path().join(".git/info"))?;
            Err(crate::error::Error::ToolNotInstalled)
        }

        let mut path = std::path::PathBuf::new();
        assert!(doomed(&mut path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_workspaces_are_distinct() {
        let a = Workspace::new().unwrap();
        let b = Workspace::new().unwrap();
        assert_ne!(a.path(), b.path());
    }
}
