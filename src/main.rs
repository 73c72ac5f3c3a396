use std::process::ExitCode;

use clap::Parser;
use paperchat::cli::{commands::{Cli, Commands}, run_cli};
use paperchat::config::AppConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c.with_base_url(cli.base_url),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Using backend at {}", config.backend.base_url);

    let command = cli.command.unwrap_or(Commands::Chat { file: None });
    run_cli(command, config).await
}
