pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::system_deployer;
pub use config::TomlConfig;
pub use core::{Collaborators, Deployer, DeployTarget, StatusPolicy};
pub use utils::error::{DeployError, Result};
