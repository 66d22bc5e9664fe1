// Adapters layer: concrete implementations of the domain ports on top of
// external tools (git, cargo, systemctl, sudo), the local disk and Discord.

pub mod cargo;
pub mod command;
pub mod discord;
pub mod filesystem;
pub mod git;
pub mod privilege;
pub mod systemd;

pub use cargo::CargoToolchain;
pub use discord::DiscordWebhook;
pub use filesystem::LocalFileSystem;
pub use git::GitCli;
pub use privilege::SudoEscalation;
pub use systemd::Systemctl;
