use clap::Parser;
use otternel_deploy::utils::{logger, validation::Validate};
use otternel_deploy::{system_deployer, CliConfig, DeployError, TomlConfig};

fn fail(e: &DeployError) -> ! {
    tracing::error!("❌ {} (category: {:?})", e, e.category());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let mut config = match TomlConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    cli.apply(&mut config);

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let deployer = match system_deployer(&config) {
        Ok(deployer) => deployer,
        Err(e) => fail(&e),
    };

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be executed");
        for planned in deployer.plan_with(&config.privilege_preview()) {
            println!("{}", planned.step);
            for command in &planned.commands {
                println!("    {}", command);
            }
        }
        return Ok(());
    }

    let code = deployer.deploy().await;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
