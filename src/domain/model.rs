use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the deployer needs to know about one service on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    pub service: String,
    pub artifact: String,
    pub project_dir: PathBuf,
    pub install_path: PathBuf,
    pub remote: String,
    pub branch: String,
}

impl DeployTarget {
    pub fn new(
        service: impl Into<String>,
        artifact: impl Into<String>,
        project_dir: impl Into<PathBuf>,
        install_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            service: service.into(),
            artifact: artifact.into(),
            project_dir: project_dir.into(),
            install_path: install_path.into(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
        }
    }

    pub fn with_source(mut self, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        self.remote = remote.into();
        self.branch = branch.into();
        self
    }
}

impl Default for DeployTarget {
    fn default() -> Self {
        Self::new(
            "otternel",
            "Otternel",
            "/opt/otternel",
            "/usr/local/bin/otternel",
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    EnterWorkspace,
    SyncSource,
    Build,
    StopService,
    InstallArtifact,
    StartService,
    ReportStatus,
}

impl Step {
    pub const ORDER: [Step; 7] = [
        Step::EnterWorkspace,
        Step::SyncSource,
        Step::Build,
        Step::StopService,
        Step::InstallArtifact,
        Step::StartService,
        Step::ReportStatus,
    ];

    pub fn number(self) -> usize {
        match self {
            Step::EnterWorkspace => 1,
            Step::SyncSource => 2,
            Step::Build => 3,
            Step::StopService => 4,
            Step::InstallArtifact => 5,
            Step::StartService => 6,
            Step::ReportStatus => 7,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Step::EnterWorkspace => "Entering project directory",
            Step::SyncSource => "Pulling latest source",
            Step::Build => "Building release artifact",
            Step::StopService => "Stopping service",
            Step::InstallArtifact => "Installing artifact",
            Step::StartService => "Reloading unit files and starting service",
            Step::ReportStatus => "Checking service status",
        }
    }

    pub fn requires_privilege(self) -> bool {
        matches!(
            self,
            Step::StopService | Step::InstallArtifact | Step::StartService
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}",
            self.number(),
            Step::ORDER.len(),
            self.description()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Release,
}

impl BuildMode {
    pub fn output_dir(self) -> &'static str {
        match self {
            BuildMode::Release => "release",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Running,
    Activating,
    Deactivating,
    Inactive,
    Failed,
    Unknown(String),
}

impl ServiceState {
    /// Parses the `Active:` value printed by `systemctl status`, e.g. `active (running) since ...`.
    pub fn from_active_line(value: &str) -> Self {
        let value = value.trim();
        let word = value.split_whitespace().next().unwrap_or_default();
        match word {
            "active" => Self::Running,
            "activating" | "reloading" => Self::Activating,
            "deactivating" => Self::Deactivating,
            "inactive" => Self::Inactive,
            "failed" => Self::Failed,
            _ => Self::Unknown(value.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ServiceState::Running)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Running => f.write_str("running"),
            ServiceState::Activating => f.write_str("activating"),
            ServiceState::Deactivating => f.write_str("deactivating"),
            ServiceState::Inactive => f.write_str("inactive"),
            ServiceState::Failed => f.write_str("failed"),
            ServiceState::Unknown(raw) if raw.is_empty() => f.write_str("unknown"),
            ServiceState::Unknown(raw) => write!(f, "unknown ({})", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub state: ServiceState,
    /// Raw text from the service manager, shown to the operator as-is.
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: Step,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct DeployReport {
    pub service: String,
    pub artifact: PathBuf,
    pub steps: Vec<StepRecord>,
    pub stop_outcome: StopOutcome,
    /// `None` when the status query itself failed under the informational policy.
    pub final_status: Option<ServiceStatus>,
}

impl DeployReport {
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn confirmed_running(&self) -> bool {
        self.final_status
            .as_ref()
            .map(|s| s.state.is_running())
            .unwrap_or(false)
    }
}

/// Outcome of a run, as handed to notifiers.
#[derive(Debug, Clone, Serialize)]
pub struct DeploySummary {
    pub service: String,
    pub succeeded: bool,
    pub failed_step: Option<Step>,
    pub message: String,
    pub final_state: Option<ServiceState>,
    pub finished_at: DateTime<Utc>,
}
