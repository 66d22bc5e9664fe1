use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Invalid value for '{field}': {reason} (got '{value}')")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Source sync failed: {message}")]
    SourceSyncError { message: String },

    #[error("Build failed: {message}")]
    BuildError { message: String },

    #[error("Service control failed ({action} '{service}'): {message}")]
    ServiceControlError {
        action: String,
        service: String,
        message: String,
    },

    #[error("Install failed: {message}")]
    InstallError { message: String },

    #[error("Elevated privilege unavailable: {message}")]
    PrivilegeError { message: String },

    #[error("Service '{service}' could not be confirmed running (state: {state})")]
    StatusUnconfirmed { service: String, state: String },

    #[error("Notification failed: {0}")]
    NotificationError(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    SourceSync,
    Build,
    ServiceControl,
    Install,
    Privilege,
    Status,
    Notification,
}

impl DeployError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeployError::ConfigurationError { .. } | DeployError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            DeployError::SourceSyncError { .. } => ErrorCategory::SourceSync,
            DeployError::BuildError { .. } => ErrorCategory::Build,
            DeployError::ServiceControlError { .. } => ErrorCategory::ServiceControl,
            DeployError::InstallError { .. } => ErrorCategory::Install,
            DeployError::PrivilegeError { .. } => ErrorCategory::Privilege,
            DeployError::StatusUnconfirmed { .. } => ErrorCategory::Status,
            DeployError::NotificationError(_) => ErrorCategory::Notification,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::SourceSync => 3,
            ErrorCategory::Build => 4,
            ErrorCategory::ServiceControl => 5,
            ErrorCategory::Install => 6,
            ErrorCategory::Privilege => 7,
            ErrorCategory::Status => 8,
            // notifications never decide the outcome of a run
            ErrorCategory::Notification => 0,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check that the project directory exists and holds a git checkout, then review the configuration file"
            }
            ErrorCategory::SourceSync => {
                "Resolve the git error above (network, credentials or merge conflict) in the project directory and rerun"
            }
            ErrorCategory::Build => {
                "Fix the compilation errors above; the running service and installed binary were not touched"
            }
            ErrorCategory::ServiceControl => {
                "Inspect the unit with `systemctl status` and `journalctl -u <service>`; rerun once the unit is healthy"
            }
            ErrorCategory::Install => {
                "The service is stopped. Fix the install path permissions or free the file, then rerun to restart it"
            }
            ErrorCategory::Privilege => {
                "Grant passwordless escalation for the deploy user or run the tool as root"
            }
            ErrorCategory::Status => {
                "The new binary is installed but the unit is not running; check the service logs"
            }
            ErrorCategory::Notification => "Check the webhook URL and network connectivity",
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        DeployError::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn service(
        action: impl Into<String>,
        service: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DeployError::ServiceControlError {
            action: action.into(),
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn install(message: impl Into<String>) -> Self {
        DeployError::InstallError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
