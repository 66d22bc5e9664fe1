use crate::adapters::command::{describe_status, Invocation};
use crate::domain::model::BuildMode;
use crate::domain::ports::BuildToolchain;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CargoToolchain {
    program: String,
}

impl CargoToolchain {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Where cargo leaves `artifact` for `mode`, relative to the project root.
    pub fn artifact_path(dir: &Path, artifact: &str, mode: BuildMode) -> PathBuf {
        dir.join("target").join(mode.output_dir()).join(artifact)
    }
}

impl Default for CargoToolchain {
    fn default() -> Self {
        Self::new("cargo")
    }
}

#[async_trait]
impl BuildToolchain for CargoToolchain {
    async fn build(&self, dir: &Path, artifact: &str, mode: BuildMode) -> Result<PathBuf> {
        let args: &[&str] = match mode {
            BuildMode::Release => &["build", "--release"],
        };
        let inv = Invocation::new(&self.program, args).in_dir(dir);

        let status = inv.run_inherited().await.map_err(|e| DeployError::BuildError {
            message: format!("could not run `{}`: {}", inv, e),
        })?;

        if !status.success() {
            return Err(DeployError::BuildError {
                message: format!("`{}` failed with {}", inv, describe_status(&status)),
            });
        }

        Ok(Self::artifact_path(dir, artifact, mode))
    }
}
