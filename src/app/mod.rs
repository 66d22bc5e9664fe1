pub mod system;

pub use system::{system_collaborators, system_deployer, webhook};
