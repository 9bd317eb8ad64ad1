//! Mini app developer binary.

use anyhow::Result;
use clap::Parser;
use miniapp_application::AppConfig;
use std::time::Duration;

mod cli;
mod commands;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    miniapp_logging::init_tracing(cli.filter_override(), config.log.filter.as_deref())?;

    tracing::debug!(config = ?cli.config, "starting miniapp devserver");

    match cli.command {
        Command::Serve { bind } => commands::serve(bind).await,
        Command::Preview { host, timeout_ms } => {
            commands::preview(&config, host.as_deref(), Duration::from_millis(timeout_ms)).await
        }
        Command::Config => commands::print_config(&config),
    }
}
