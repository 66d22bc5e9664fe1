use crate::adapters::command::{failure_text, Invocation};
use crate::domain::ports::FileSystem;
use crate::domain::privilege::PrivilegeContext;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;

/// The local disk. Escalated contexts go through `cp`/`chmod` so the copy
/// happens with the escalated user's permissions.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }

    async fn run_privileged(
        privilege: &PrivilegeContext,
        program: &str,
        args: &[&str],
    ) -> Result<()> {
        let inv = Invocation::privileged(privilege, program, args);
        let output = inv
            .run_captured()
            .await
            .map_err(|e| DeployError::install(format!("could not run `{}`: {}", inv, e)))?;

        if !output.status.success() {
            return Err(DeployError::install(format!(
                "`{}` failed: {}",
                inv,
                failure_text(&output)
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn enter_workspace(&self, dir: &Path) -> Result<()> {
        let inaccessible = |e: std::io::Error| {
            DeployError::config(format!(
                "project directory {} is not accessible: {}",
                dir.display(),
                e
            ))
        };

        let metadata = tokio::fs::metadata(dir).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                DeployError::config(format!("project directory {} does not exist", dir.display()))
            }
            _ => inaccessible(e),
        })?;

        if !metadata.is_dir() {
            return Err(DeployError::config(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        tokio::fs::read_dir(dir).await.map_err(inaccessible)?;

        // `.git` is a directory in a normal clone and a file in a worktree
        let has_checkout = tokio::fs::try_exists(dir.join(".git"))
            .await
            .unwrap_or(false);
        if !has_checkout {
            return Err(DeployError::config(format!(
                "{} is not a git checkout",
                dir.display()
            )));
        }

        Ok(())
    }

    async fn copy(&self, privilege: &PrivilegeContext, src: &Path, dst: &Path) -> Result<()> {
        match tokio::fs::metadata(src).await {
            Ok(meta) if meta.is_file() => {}
            _ => {
                return Err(DeployError::install(format!(
                    "build artifact {} is missing",
                    src.display()
                )))
            }
        }

        if privilege.is_escalated() {
            let (src, dst) = (src.to_string_lossy(), dst.to_string_lossy());
            return Self::run_privileged(privilege, "cp", &[&*src, &*dst]).await;
        }

        tokio::fs::copy(src, dst).await.map_err(|e| {
            DeployError::install(format!(
                "copying {} to {}: {}",
                src.display(),
                dst.display(),
                e
            ))
        })?;
        Ok(())
    }

    async fn set_executable(&self, privilege: &PrivilegeContext, path: &Path) -> Result<()> {
        if privilege.is_escalated() {
            let path = path.to_string_lossy();
            return Self::run_privileged(privilege, "chmod", &["+x", &*path]).await;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = tokio::fs::metadata(path)
                .await
                .map_err(|e| DeployError::install(format!("reading {}: {}", path.display(), e)))?;
            let mut permissions = metadata.permissions();
            permissions.set_mode(permissions.mode() | 0o111);
            tokio::fs::set_permissions(path, permissions)
                .await
                .map_err(|e| DeployError::install(format!("chmod {}: {}", path.display(), e)))?;
        }

        Ok(())
    }
}
