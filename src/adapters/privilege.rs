use crate::adapters::command::{failure_text, Invocation};
use crate::domain::ports::PrivilegeEscalation;
use crate::domain::privilege::PrivilegeContext;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;

/// `sudo -n` style escalation. An empty program means commands run as the current user.
#[derive(Debug, Clone)]
pub struct SudoEscalation {
    program: String,
    args: Vec<String>,
}

impl SudoEscalation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn is_root() -> bool {
        #[cfg(unix)]
        {
            nix::unistd::geteuid().is_root()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Runs `true` through the escalation command; non-interactive sudo fails fast
    /// instead of prompting when no credentials are cached.
    async fn probe(&self) -> Result<PrivilegeContext> {
        let mut args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        args.push("true");
        let inv = Invocation::new(&self.program, &args);

        let output = inv
            .run_captured()
            .await
            .map_err(|e| DeployError::PrivilegeError {
                message: format!("could not run `{}`: {}", inv, e),
            })?;

        if !output.status.success() {
            return Err(DeployError::PrivilegeError {
                message: format!("`{}` was refused: {}", inv, failure_text(&output)),
            });
        }

        Ok(PrivilegeContext::escalated(
            self.program.clone(),
            self.args.clone(),
        ))
    }
}

impl Default for SudoEscalation {
    fn default() -> Self {
        Self::new("sudo", vec!["-n".to_string()])
    }
}

#[async_trait]
impl PrivilegeEscalation for SudoEscalation {
    async fn acquire(&self) -> Result<PrivilegeContext> {
        if self.program.trim().is_empty() {
            tracing::debug!("no escalation configured, running privileged steps directly");
            return Ok(PrivilegeContext::already_elevated());
        }

        if Self::is_root() {
            tracing::debug!("running as root, no escalation needed");
            return Ok(PrivilegeContext::already_elevated());
        }

        let privilege = self.probe().await?;
        tracing::info!("🔑 Privileged steps will run through {}", self.program);
        Ok(privilege)
    }
}
