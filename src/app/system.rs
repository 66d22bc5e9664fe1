use crate::adapters::{
    CargoToolchain, DiscordWebhook, GitCli, LocalFileSystem, SudoEscalation, Systemctl,
};
use crate::config::TomlConfig;
use crate::core::{Collaborators, Deployer};
use crate::utils::error::Result;

/// The real tools on this host.
pub fn system_collaborators(config: &TomlConfig) -> Collaborators {
    Collaborators {
        vcs: Box::new(GitCli::default()),
        toolchain: Box::new(CargoToolchain::default()),
        services: Box::new(Systemctl::default()),
        fs: Box::new(LocalFileSystem::new()),
        privilege: Box::new(SudoEscalation::new(
            config.privilege.command.clone(),
            config.privilege.args.clone(),
        )),
    }
}

/// `None` when notifications are switched off.
pub fn webhook(config: &TomlConfig) -> Result<Option<DiscordWebhook>> {
    let notify = &config.notify;
    if !notify.enabled {
        return Ok(None);
    }

    let mut hook = DiscordWebhook::new(true, notify.url.clone())
        .with_colors(notify.success_color()?, notify.failure_color()?);
    if let Some(username) = &notify.username {
        hook = hook.with_username(username.clone());
    }
    Ok(Some(hook))
}

pub fn system_deployer(config: &TomlConfig) -> Result<Deployer> {
    let mut deployer = Deployer::new(config.target(), system_collaborators(config))
        .with_status_policy(config.status_policy());

    if let Some(hook) = webhook(config)? {
        deployer = deployer.with_notifier(Box::new(hook));
    }

    Ok(deployer)
}
