use crate::domain::model::{
    BuildMode, DeployReport, DeploySummary, DeployTarget, ServiceStatus, Step, StepRecord,
    StopOutcome,
};
use crate::domain::ports::{
    BuildToolchain, FileSystem, Notifier, PrivilegeEscalation, ServiceManager, VersionControl,
};
use crate::domain::privilege::PrivilegeContext;
use crate::utils::error::{DeployError, Result};
use std::path::PathBuf;
use std::time::Instant;

/// What to do when the final status check cannot confirm the unit is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Warn and still report success.
    #[default]
    Informational,
    /// Fail the run with `StatusUnconfirmed`.
    RequireRunning,
}

/// The external tools a deployment drives.
pub struct Collaborators {
    pub vcs: Box<dyn VersionControl>,
    pub toolchain: Box<dyn BuildToolchain>,
    pub services: Box<dyn ServiceManager>,
    pub fs: Box<dyn FileSystem>,
    pub privilege: Box<dyn PrivilegeEscalation>,
}

#[derive(Debug, Clone)]
pub struct PlannedStep {
    pub step: Step,
    pub commands: Vec<String>,
}

struct StepFailure {
    step: Step,
    error: DeployError,
}

#[derive(Default)]
struct RunState {
    artifact: Option<PathBuf>,
    privilege: Option<PrivilegeContext>,
    stop_outcome: Option<StopOutcome>,
    final_status: Option<ServiceStatus>,
    records: Vec<StepRecord>,
}

impl RunState {
    fn privilege(&self) -> Result<&PrivilegeContext> {
        self.privilege.as_ref().ok_or_else(|| DeployError::PrivilegeError {
            message: "no privilege context acquired before a privileged step".to_string(),
        })
    }

    fn artifact(&self) -> Result<&PathBuf> {
        self.artifact
            .as_ref()
            .ok_or_else(|| DeployError::install("no build artifact was produced"))
    }
}

/// Runs the deployment steps in order and stops at the first failure.
///
/// Nothing is rolled back: a failure leaves the host exactly as the failing step
/// left it, and rerunning the whole sequence is the retry mechanism.
pub struct Deployer {
    target: DeployTarget,
    collaborators: Collaborators,
    notifier: Option<Box<dyn Notifier>>,
    status_policy: StatusPolicy,
}

impl Deployer {
    pub fn new(target: DeployTarget, collaborators: Collaborators) -> Self {
        Self {
            target,
            collaborators,
            notifier: None,
            status_policy: StatusPolicy::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn target(&self) -> &DeployTarget {
        &self.target
    }

    /// The steps and the commands the system adapters run for them, as the current user.
    pub fn plan(&self) -> Vec<PlannedStep> {
        self.plan_with(&PrivilegeContext::already_elevated())
    }

    /// Same as [`plan`](Self::plan), with privileged steps rendered through `privilege`.
    /// The workspace check is done in-process and is described rather than spelled out.
    pub fn plan_with(&self, privilege: &PrivilegeContext) -> Vec<PlannedStep> {
        let t = &self.target;
        let artifact = t
            .project_dir
            .join("target")
            .join(BuildMode::Release.output_dir())
            .join(&t.artifact);
        let artifact = artifact.to_string_lossy();
        let install = t.install_path.to_string_lossy();
        let service = t.service.as_str();

        Step::ORDER
            .into_iter()
            .map(|step| {
                let escalate = step.requires_privilege().then_some(privilege);
                let run = |program: &str, args: &[&str]| command_line(escalate, program, args);
                let check = |program: &str, args: &[&str]| command_line(None, program, args);

                let commands = match step {
                    Step::EnterWorkspace => {
                        vec![format!("check {} is a git checkout", t.project_dir.display())]
                    }
                    Step::SyncSource => {
                        vec![check("git", &["pull", t.remote.as_str(), t.branch.as_str()])]
                    }
                    Step::Build => vec![check("cargo", &["build", "--release"])],
                    Step::StopService => vec![
                        check("systemctl", &["is-active", service]),
                        run("systemctl", &["stop", service]),
                    ],
                    Step::InstallArtifact => vec![
                        run("cp", &[&*artifact, &*install]),
                        run("chmod", &["+x", &*install]),
                    ],
                    Step::StartService => vec![
                        run("systemctl", &["daemon-reload"]),
                        run("systemctl", &["start", service]),
                        check("systemctl", &["is-active", service]),
                    ],
                    Step::ReportStatus => {
                        vec![check("systemctl", &["status", service, "--no-pager"])]
                    }
                };
                PlannedStep { step, commands }
            })
            .collect()
    }

    /// Runs the full sequence and maps the outcome to a process exit code.
    pub async fn deploy(&self) -> i32 {
        match self.run().await {
            Ok(report) => {
                let state = report
                    .final_status
                    .as_ref()
                    .map(|s| s.state.to_string())
                    .unwrap_or_else(|| "unconfirmed".to_string());
                tracing::info!(
                    "✅ Deployed {} in {:?} (service {})",
                    report.service,
                    report.total_duration(),
                    state
                );
                println!("✅ Deployed {} (service {})", report.service, state);
                0
            }
            Err(e) => {
                eprintln!("💡 {}", e.recovery_suggestion());
                e.exit_code()
            }
        }
    }

    pub async fn run(&self) -> Result<DeployReport> {
        tracing::info!(
            service = %self.target.service,
            project_dir = %self.target.project_dir.display(),
            "🚀 Starting deployment"
        );

        let outcome = self.execute_all().await;
        self.notify(&outcome).await;
        outcome.map_err(|failure| failure.error)
    }

    async fn execute_all(&self) -> std::result::Result<DeployReport, StepFailure> {
        let mut state = RunState::default();

        for step in Step::ORDER {
            println!("{}", step);
            tracing::debug!(step = step.number(), "{}", step.description());

            let started = Instant::now();
            if let Err(error) = self.execute_step(step, &mut state).await {
                tracing::error!("❌ {} failed: {}", step, error);
                eprintln!("❌ {} failed: {}", step, error);
                return Err(StepFailure { step, error });
            }

            let duration = started.elapsed();
            tracing::debug!(step = step.number(), "step finished in {:?}", duration);
            state.records.push(StepRecord { step, duration });
        }

        Ok(DeployReport {
            service: self.target.service.clone(),
            artifact: state.artifact.unwrap_or_default(),
            steps: state.records,
            stop_outcome: state.stop_outcome.unwrap_or(StopOutcome::Stopped),
            final_status: state.final_status,
        })
    }

    /// Acquired once, on the first step that needs it; nothing is stopped without it.
    async fn ensure_privilege(&self, step: Step, state: &mut RunState) -> Result<()> {
        if step.requires_privilege() && state.privilege.is_none() {
            state.privilege = Some(self.collaborators.privilege.acquire().await?);
        }
        Ok(())
    }

    async fn execute_step(&self, step: Step, state: &mut RunState) -> Result<()> {
        self.ensure_privilege(step, state).await?;

        let t = &self.target;
        let c = &self.collaborators;

        match step {
            Step::EnterWorkspace => c.fs.enter_workspace(&t.project_dir).await,
            Step::SyncSource => c.vcs.pull(&t.project_dir, &t.remote, &t.branch).await,
            Step::Build => {
                let artifact = c
                    .toolchain
                    .build(&t.project_dir, &t.artifact, BuildMode::Release)
                    .await?;
                tracing::info!("📦 Built {}", artifact.display());
                state.artifact = Some(artifact);
                Ok(())
            }
            Step::StopService => {
                let outcome = c.services.stop(state.privilege()?, &t.service).await?;
                if outcome == StopOutcome::AlreadyStopped {
                    tracing::info!("⏭️ {} was not running", t.service);
                }
                state.stop_outcome = Some(outcome);
                Ok(())
            }
            Step::InstallArtifact => {
                let privilege = state.privilege()?;
                let artifact = state.artifact()?;
                c.fs.copy(privilege, artifact, &t.install_path).await?;
                c.fs.set_executable(privilege, &t.install_path).await?;
                tracing::info!("📁 Installed {}", t.install_path.display());
                Ok(())
            }
            Step::StartService => {
                let privilege = state.privilege()?;
                c.services.reload_config(privilege).await?;
                c.services.start(privilege, &t.service).await
            }
            Step::ReportStatus => self.report_status(state).await,
        }
    }

    async fn report_status(&self, state: &mut RunState) -> Result<()> {
        let service = &self.target.service;

        let status = match self.collaborators.services.status(service).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("⚠️ Could not query status of {}: {}", service, e);
                return match self.status_policy {
                    StatusPolicy::Informational => Ok(()),
                    StatusPolicy::RequireRunning => Err(e),
                };
            }
        };

        if !status.description.trim().is_empty() {
            println!("{}", status.description.trim_end());
        }

        let running = status.state.is_running();
        let state_text = status.state.to_string();
        state.final_status = Some(status);

        if running {
            tracing::info!("🟢 {} is running", service);
            return Ok(());
        }

        tracing::warn!("⚠️ {} is {} after deployment", service, state_text);
        match self.status_policy {
            StatusPolicy::Informational => Ok(()),
            StatusPolicy::RequireRunning => Err(DeployError::StatusUnconfirmed {
                service: service.clone(),
                state: state_text,
            }),
        }
    }

    fn summarize(&self, outcome: &std::result::Result<DeployReport, StepFailure>) -> DeploySummary {
        match outcome {
            Ok(report) => {
                let final_state = report.final_status.as_ref().map(|s| s.state.clone());
                let state_text = final_state
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unconfirmed".to_string());
                DeploySummary {
                    service: report.service.clone(),
                    succeeded: true,
                    failed_step: None,
                    message: format!(
                        "Installed {} ({})",
                        self.target.install_path.display(),
                        state_text
                    ),
                    final_state,
                    finished_at: chrono::Utc::now(),
                }
            }
            Err(failure) => DeploySummary {
                service: self.target.service.clone(),
                succeeded: false,
                failed_step: Some(failure.step),
                message: format!("{} failed: {}", failure.step, failure.error),
                final_state: None,
                finished_at: chrono::Utc::now(),
            },
        }
    }

    async fn notify(&self, outcome: &std::result::Result<DeployReport, StepFailure>) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let summary = self.summarize(outcome);
        if let Err(e) = notifier.notify(&summary).await {
            tracing::warn!("⚠️ Deployment notification failed: {}", e);
        }
    }
}

fn command_line(privilege: Option<&PrivilegeContext>, program: &str, args: &[&str]) -> String {
    let (program, args) = match privilege {
        Some(privilege) => privilege.argv(program, args),
        None => (
            program.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ),
    };
    std::iter::once(program)
        .chain(args)
        .collect::<Vec<_>>()
        .join(" ")
}
