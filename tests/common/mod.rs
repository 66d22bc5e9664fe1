#![allow(dead_code)]

use async_trait::async_trait;
use otternel_deploy::core::{
    BuildMode, BuildToolchain, Collaborators, DeploySummary, FileSystem, Notifier,
    PrivilegeContext, PrivilegeEscalation, ServiceManager, ServiceState, ServiceStatus,
    StopOutcome, VersionControl,
};
use otternel_deploy::{DeployError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Simulated single host: a checkout, a build output, an installed binary and one unit.
#[derive(Debug)]
pub struct HostState {
    pub calls: Vec<String>,
    pub fail_on: HashSet<&'static str>,
    pub remote_head: String,
    pub checkout: String,
    pub built: Option<String>,
    pub installed: String,
    pub running: bool,
    pub crashes_on_start: bool,
    pub privilege_denied: bool,
    pub privilege_requests: usize,
}

#[derive(Clone)]
pub struct MockHost {
    state: Arc<Mutex<HostState>>,
}

impl MockHost {
    /// v1 installed and running, v2 waiting on the remote.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState {
                calls: Vec::new(),
                fail_on: HashSet::new(),
                remote_head: "v2".to_string(),
                checkout: "v1".to_string(),
                built: None,
                installed: "v1".to_string(),
                running: true,
                crashes_on_start: false,
                privilege_denied: false,
                privilege_requests: 0,
            })),
        }
    }

    pub fn failing_on(self, call: &'static str) -> Self {
        self.state.lock().unwrap().fail_on.insert(call);
        self
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().fail_on.clear();
    }

    pub fn stopped(self) -> Self {
        self.state.lock().unwrap().running = false;
        self
    }

    pub fn crashing_on_start(self) -> Self {
        self.state.lock().unwrap().crashes_on_start = true;
        self
    }

    pub fn without_privilege(self) -> Self {
        self.state.lock().unwrap().privilege_denied = true;
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            vcs: Box::new(self.clone()),
            toolchain: Box::new(self.clone()),
            services: Box::new(self.clone()),
            fs: Box::new(self.clone()),
            privilege: Box::new(self.clone()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    pub fn installed(&self) -> String {
        self.state.lock().unwrap().installed.clone()
    }

    pub fn privilege_requests(&self) -> usize {
        self.state.lock().unwrap().privilege_requests
    }

    fn enter(&self, call: &'static str, fail: impl FnOnce() -> DeployError) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        if state.fail_on.contains(call) {
            return Err(fail());
        }
        Ok(())
    }

    fn require_escalated(privilege: &PrivilegeContext, call: &str) -> Result<()> {
        if !privilege.is_escalated() {
            return Err(DeployError::PrivilegeError {
                message: format!("{} called without escalation", call),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VersionControl for MockHost {
    async fn pull(&self, _dir: &Path, _remote: &str, _branch: &str) -> Result<()> {
        self.enter("pull", || DeployError::SourceSyncError {
            message: "CONFLICT (content): Merge conflict in src/main.rs".to_string(),
        })?;
        let mut state = self.state.lock().unwrap();
        state.checkout = state.remote_head.clone();
        Ok(())
    }
}

#[async_trait]
impl BuildToolchain for MockHost {
    async fn build(&self, dir: &Path, artifact: &str, mode: BuildMode) -> Result<PathBuf> {
        self.enter("build", || DeployError::BuildError {
            message: "error[E0425]: cannot find value `otter`".to_string(),
        })?;
        let mut state = self.state.lock().unwrap();
        state.built = Some(state.checkout.clone());
        Ok(dir.join("target").join(mode.output_dir()).join(artifact))
    }
}

#[async_trait]
impl ServiceManager for MockHost {
    async fn stop(&self, privilege: &PrivilegeContext, service: &str) -> Result<StopOutcome> {
        Self::require_escalated(privilege, "stop")?;
        self.enter("stop", || {
            DeployError::service("stop", service, "Failed to connect to bus")
        })?;
        let mut state = self.state.lock().unwrap();
        if state.running {
            state.running = false;
            Ok(StopOutcome::Stopped)
        } else {
            Ok(StopOutcome::AlreadyStopped)
        }
    }

    async fn reload_config(&self, privilege: &PrivilegeContext) -> Result<()> {
        Self::require_escalated(privilege, "daemon-reload")?;
        self.enter("daemon-reload", || {
            DeployError::service("daemon-reload", "systemd", "Access denied")
        })
    }

    async fn start(&self, privilege: &PrivilegeContext, service: &str) -> Result<()> {
        Self::require_escalated(privilege, "start")?;
        self.enter("start", || {
            DeployError::service("start", service, "Job for otternel.service failed")
        })?;
        let mut state = self.state.lock().unwrap();
        state.running = !state.crashes_on_start;
        Ok(())
    }

    async fn status(&self, service: &str) -> Result<ServiceStatus> {
        self.enter("status", || {
            DeployError::service("status", service, "Failed to connect to bus")
        })?;
        let state = self.state.lock().unwrap();
        let (unit_state, active) = if state.running {
            (ServiceState::Running, "active (running)")
        } else {
            (ServiceState::Failed, "failed (Result: exit-code)")
        };
        Ok(ServiceStatus {
            state: unit_state,
            description: format!("● {}.service\n     Active: {}\n", service, active),
        })
    }
}

#[async_trait]
impl FileSystem for MockHost {
    async fn enter_workspace(&self, dir: &Path) -> Result<()> {
        self.enter("cd", || {
            DeployError::config(format!("project directory {} does not exist", dir.display()))
        })
    }

    async fn copy(&self, privilege: &PrivilegeContext, src: &Path, _dst: &Path) -> Result<()> {
        Self::require_escalated(privilege, "copy")?;
        self.enter("copy", || {
            DeployError::install("cp: cannot create regular file: Permission denied")
        })?;
        let mut state = self.state.lock().unwrap();
        match state.built.clone() {
            Some(build) => {
                state.installed = build;
                Ok(())
            }
            None => Err(DeployError::install(format!(
                "build artifact {} is missing",
                src.display()
            ))),
        }
    }

    async fn set_executable(&self, privilege: &PrivilegeContext, _path: &Path) -> Result<()> {
        Self::require_escalated(privilege, "chmod")?;
        self.enter("chmod", || DeployError::install("chmod: Operation not permitted"))
    }
}

#[async_trait]
impl PrivilegeEscalation for MockHost {
    async fn acquire(&self) -> Result<PrivilegeContext> {
        let mut state = self.state.lock().unwrap();
        state.privilege_requests += 1;
        if state.privilege_denied {
            return Err(DeployError::PrivilegeError {
                message: "sudo: a password is required".to_string(),
            });
        }
        Ok(PrivilegeContext::escalated("sudo", vec!["-n".to_string()]))
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub summaries: Arc<Mutex<Vec<DeploySummary>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn summaries(&self) -> Vec<DeploySummary> {
        self.summaries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, summary: &DeploySummary) -> Result<()> {
        self.summaries.lock().unwrap().push(summary.clone());
        if self.fail {
            return Err(DeployError::config("webhook unreachable"));
        }
        Ok(())
    }
}
