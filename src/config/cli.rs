use crate::config::toml_config::TomlConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "otternel-deploy")]
#[command(about = "Pull, build and reinstall the Otternel service on this host")]
pub struct CliConfig {
    /// TOML configuration file (defaults to ./otternel-deploy.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    /// Print the steps and commands without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Exit non-zero unless the service is confirmed running at the end
    #[arg(long)]
    pub strict_status: bool,

    /// Skip the webhook notification
    #[arg(long)]
    pub no_notify: bool,
}

impl CliConfig {
    /// Flags win over the file.
    pub fn apply(&self, config: &mut TomlConfig) {
        if self.strict_status {
            config.report.require_running = true;
        }
        if self.no_notify {
            config.notify.enabled = false;
        }
    }
}
