use crate::adapters::command::{failure_text, Invocation};
use crate::domain::model::{ServiceState, ServiceStatus, StopOutcome};
use crate::domain::ports::ServiceManager;
use crate::domain::privilege::PrivilegeContext;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;

/// systemd via `systemctl`.
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: String,
    base_args: Vec<String>,
}

impl Systemctl {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_base_args(program, Vec::new())
    }

    /// Arguments placed before every subcommand, e.g. `--user`.
    pub fn with_base_args(program: impl Into<String>, base_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            base_args,
        }
    }

    fn argv<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        self.base_args
            .iter()
            .map(String::as_str)
            .chain(args.iter().copied())
            .collect()
    }

    async fn active_state(&self, service: &str) -> Result<ServiceState> {
        let inv = Invocation::new(&self.program, &self.argv(&["is-active", service]));
        // is-active exits non-zero for anything but "active"; only a spawn failure is an error
        let output = inv
            .run_captured()
            .await
            .map_err(|e| unreachable_manager("is-active", service, &inv, e))?;

        Ok(ServiceState::from_active_line(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    async fn privileged(
        &self,
        privilege: &PrivilegeContext,
        action: &str,
        service: &str,
        args: &[&str],
    ) -> Result<()> {
        let inv = Invocation::privileged(privilege, &self.program, &self.argv(args));
        let output = inv
            .run_captured()
            .await
            .map_err(|e| unreachable_manager(action, service, &inv, e))?;

        if !output.status.success() {
            return Err(DeployError::service(action, service, failure_text(&output)));
        }
        Ok(())
    }
}

fn unreachable_manager(action: &str, service: &str, inv: &Invocation, e: std::io::Error) -> DeployError {
    DeployError::service(action, service, format!("could not run `{}`: {}", inv, e))
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new("systemctl")
    }
}

/// Pulls the state out of the `Active:` line of `systemctl status` output.
pub fn parse_status_output(stdout: &str) -> Option<ServiceState> {
    stdout
        .lines()
        .map(str::trim_start)
        .find_map(|line| line.strip_prefix("Active:"))
        .map(ServiceState::from_active_line)
}

#[async_trait]
impl ServiceManager for Systemctl {
    async fn stop(&self, privilege: &PrivilegeContext, service: &str) -> Result<StopOutcome> {
        match self.active_state(service).await? {
            ServiceState::Inactive | ServiceState::Failed => {
                return Ok(StopOutcome::AlreadyStopped);
            }
            state => tracing::debug!("{} is {} before stop", service, state),
        }

        if let Err(e) = self
            .privileged(privilege, "stop", service, &["stop", service])
            .await
        {
            // a unit that went away on its own still counts as stopped
            return match self.active_state(service).await? {
                ServiceState::Inactive | ServiceState::Failed => Ok(StopOutcome::AlreadyStopped),
                _ => Err(e),
            };
        }

        Ok(StopOutcome::Stopped)
    }

    async fn reload_config(&self, privilege: &PrivilegeContext) -> Result<()> {
        self.privileged(privilege, "daemon-reload", "systemd", &["daemon-reload"])
            .await
    }

    async fn start(&self, privilege: &PrivilegeContext, service: &str) -> Result<()> {
        self.privileged(privilege, "start", service, &["start", service])
            .await?;

        let state = self.active_state(service).await?;
        if !state.is_running() {
            return Err(DeployError::service(
                "start",
                service,
                format!("unit is {} after start", state),
            ));
        }
        Ok(())
    }

    async fn status(&self, service: &str) -> Result<ServiceStatus> {
        let inv = Invocation::new(&self.program, &self.argv(&["status", service, "--no-pager"]));
        let output = inv
            .run_captured()
            .await
            .map_err(|e| unreachable_manager("status", service, &inv, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        match parse_status_output(&stdout) {
            Some(state) => Ok(ServiceStatus {
                state,
                description: stdout,
            }),
            None => Err(DeployError::service("status", service, failure_text(&output))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_RUNNING: &str = "\
● otternel.service - Otternel Discord bot
     Loaded: loaded (/etc/systemd/system/otternel.service; enabled; preset: enabled)
     Active: active (running) since Mon 2026-10-19 08:00:00 UTC; 3s ago
   Main PID: 4242 (otternel)
";

    #[test]
    fn test_parse_status_output_running() {
        assert_eq!(
            parse_status_output(STATUS_RUNNING),
            Some(ServiceState::Running)
        );
    }

    #[test]
    fn test_parse_status_output_without_active_line() {
        assert_eq!(parse_status_output("Unit otternel.service could not be found."), None);
    }

    #[cfg(unix)]
    mod fake_systemctl {
        use super::*;
        use std::path::{Path, PathBuf};
        use tempfile::TempDir;

        /// A shell script standing in for systemctl; every call is appended to `calls`.
        fn fake(dir: &TempDir, body: &str) -> (Systemctl, PathBuf) {
            let calls = dir.path().join("calls");
            let script = dir.path().join("systemctl");
            let content = format!(
                "#!/bin/sh\necho \"$@\" >> '{}'\n{}\n",
                calls.display(),
                body
            );
            std::fs::write(&script, content).unwrap();
            let base_args = vec![script.to_string_lossy().to_string()];
            (Systemctl::with_base_args("sh", base_args), calls)
        }

        fn calls(path: &Path) -> Vec<String> {
            std::fs::read_to_string(path)
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }

        #[tokio::test]
        async fn test_stop_inactive_unit_is_already_stopped() {
            let dir = TempDir::new().unwrap();
            let (systemctl, log) = fake(&dir, "echo inactive; exit 3");

            let outcome = systemctl
                .stop(&PrivilegeContext::already_elevated(), "otternel")
                .await
                .unwrap();

            assert_eq!(outcome, StopOutcome::AlreadyStopped);
            assert_eq!(calls(&log), vec!["is-active otternel"]);
        }

        #[tokio::test]
        async fn test_stop_running_unit() {
            let dir = TempDir::new().unwrap();
            let (systemctl, log) = fake(&dir, "echo active; exit 0");

            let outcome = systemctl
                .stop(&PrivilegeContext::already_elevated(), "otternel")
                .await
                .unwrap();

            assert_eq!(outcome, StopOutcome::Stopped);
            assert_eq!(calls(&log), vec!["is-active otternel", "stop otternel"]);
        }

        #[tokio::test]
        async fn test_unreachable_manager_fails_stop() {
            let dir = TempDir::new().unwrap();
            let (systemctl, _log) = fake(
                &dir,
                "echo 'Failed to connect to bus: No such file or directory' >&2; exit 1",
            );

            let err = systemctl
                .stop(&PrivilegeContext::already_elevated(), "otternel")
                .await
                .unwrap_err();

            assert!(matches!(err, DeployError::ServiceControlError { .. }));
            assert!(err.to_string().contains("Failed to connect to bus"));
        }

        #[tokio::test]
        async fn test_start_requires_running_state() {
            let dir = TempDir::new().unwrap();
            let (systemctl, _log) = fake(
                &dir,
                "if [ \"$1\" = is-active ]; then echo failed; exit 3; fi; exit 0",
            );

            let err = systemctl
                .start(&PrivilegeContext::already_elevated(), "otternel")
                .await
                .unwrap_err();
            assert!(err.to_string().contains("unit is failed after start"));
        }

        #[tokio::test]
        async fn test_status_reads_active_line() {
            let dir = TempDir::new().unwrap();
            let body = format!("cat <<'EOF'\n{}EOF", STATUS_RUNNING);
            let (systemctl, log) = fake(&dir, &body);

            let status = systemctl.status("otternel").await.unwrap();
            assert_eq!(status.state, ServiceState::Running);
            assert!(status.description.contains("Main PID: 4242"));
            assert_eq!(calls(&log), vec!["status otternel --no-pager"]);
        }
    }
}
