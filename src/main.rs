use clap::Parser;
use color_eyre::Result;
use dotenvy::dotenv;
use log::debug;

use ingl_cli::{
    cli::{run_address, run_config, run_ledger, Cli, CliContext, Command},
    config::{config_path, CliConfig},
    logging::setup_logging,
};

async fn run(cli: Cli) -> Result<()> {
    let path = config_path()?;
    if let Command::Config(command) = &cli.command {
        return run_config(command, &path);
    }
    if let Command::Ledger(command) = &cli.command {
        return run_ledger(command);
    }

    let config = CliConfig::load(&path)?.resolve(&cli.overrides())?;
    debug!("Resolved config: {:?}", config);

    if let Command::Address { role } = &cli.command {
        return run_address(&config.program_id, *role);
    }

    let context = CliContext::connect(config, cli.program_log_level)?;
    context.run(cli.command).await
}

fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli))
}
