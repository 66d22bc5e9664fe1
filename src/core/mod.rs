pub mod deployer;

pub use crate::domain::model::{
    BuildMode, DeployReport, DeploySummary, DeployTarget, ServiceState, ServiceStatus, Step,
    StepRecord, StopOutcome,
};
pub use crate::domain::ports::{
    BuildToolchain, FileSystem, Notifier, PrivilegeEscalation, ServiceManager, VersionControl,
};
pub use crate::domain::privilege::PrivilegeContext;
pub use crate::utils::error::Result;
pub use deployer::{Collaborators, Deployer, PlannedStep, StatusPolicy};
