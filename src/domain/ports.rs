use crate::domain::model::{BuildMode, DeploySummary, ServiceStatus, StopOutcome};
use crate::domain::privilege::PrivilegeContext;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Fetch and merge `remote/branch` into the checkout at `dir`.
    async fn pull(&self, dir: &Path, remote: &str, branch: &str) -> Result<()>;
}

#[async_trait]
pub trait BuildToolchain: Send + Sync {
    /// Build the project at `dir` and return where `artifact` ended up.
    async fn build(&self, dir: &Path, artifact: &str, mode: BuildMode) -> Result<PathBuf>;
}

#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Stopping a unit that is not running is a success.
    async fn stop(&self, privilege: &PrivilegeContext, service: &str) -> Result<StopOutcome>;
    async fn reload_config(&self, privilege: &PrivilegeContext) -> Result<()>;
    async fn start(&self, privilege: &PrivilegeContext, service: &str) -> Result<()>;
    async fn status(&self, service: &str) -> Result<ServiceStatus>;
}

#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Check that `dir` is an accessible version-control checkout.
    async fn enter_workspace(&self, dir: &Path) -> Result<()>;
    async fn copy(&self, privilege: &PrivilegeContext, src: &Path, dst: &Path) -> Result<()>;
    async fn set_executable(&self, privilege: &PrivilegeContext, path: &Path) -> Result<()>;
}

#[async_trait]
pub trait PrivilegeEscalation: Send + Sync {
    async fn acquire(&self) -> Result<PrivilegeContext>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, summary: &DeploySummary) -> Result<()>;
}
