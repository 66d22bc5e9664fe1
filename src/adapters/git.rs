use crate::adapters::command::{describe_status, Invocation};
use crate::domain::ports::VersionControl;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;
use std::path::Path;

/// `git` on the PATH.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn pull(&self, dir: &Path, remote: &str, branch: &str) -> Result<()> {
        let inv = Invocation::new(&self.program, &["pull", remote, branch]).in_dir(dir);

        let status = inv
            .run_inherited()
            .await
            .map_err(|e| DeployError::SourceSyncError {
                message: format!("could not run `{}`: {}", inv, e),
            })?;

        if !status.success() {
            return Err(DeployError::SourceSyncError {
                message: format!("`{}` failed with {}", inv, describe_status(&status)),
            });
        }

        tracing::info!("🔄 {} is up to date with {}/{}", dir.display(), remote, branch);
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_pull_success() {
        let dir = TempDir::new().unwrap();
        let git = GitCli::new("true");
        assert!(git.pull(dir.path(), "origin", "main").await.is_ok());
    }

    #[tokio::test]
    async fn test_pull_failure_is_source_sync_error() {
        let dir = TempDir::new().unwrap();
        let git = GitCli::new("false");

        let err = git.pull(dir.path(), "origin", "main").await.unwrap_err();
        assert!(matches!(err, DeployError::SourceSyncError { .. }));
        assert!(err.to_string().contains("false pull origin main"));
    }

    #[tokio::test]
    async fn test_missing_git_binary_is_source_sync_error() {
        let dir = TempDir::new().unwrap();
        let git = GitCli::new("definitely-not-a-real-git-binary");

        let err = git.pull(dir.path(), "origin", "main").await.unwrap_err();
        assert!(matches!(err, DeployError::SourceSyncError { .. }));
    }
}
