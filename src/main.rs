//! SprintPilot CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;

use sprintpilot::cli::{commands, Cli, Commands};
use sprintpilot::domain::models::Config;
use sprintpilot::infrastructure::config::ConfigLoader;
use sprintpilot::infrastructure::logging::{LogConfig, LoggerImpl};

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let log_config = LogConfig::try_from(&config.logging).context("Invalid logging configuration")?;
    let _logger = LoggerImpl::init(&log_config).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Chat(args) => commands::chat::execute(args, &config, cli.json).await,
        Commands::Parse(args) => commands::parse::execute(&args, cli.json),
        Commands::Config(args) => commands::config::execute(&args, &config, cli.json),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        sprintpilot::cli::handle_error(err, json_mode);
    }
}
