//! gcal-mcp CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use gcal_mcp_client::cli::{Cli, Command};
use gcal_mcp_client::commands;
use gcal_mcp_client::error::ClientResult;
use gcal_mcp_core::{TracingConfig, init_tracing};
use gcal_mcp_server::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut tracing_config = match cli.command {
        Some(Command::Auth { .. }) => TracingConfig::cli(),
        None => TracingConfig::server(),
    }
    .with_format(cli.log_format.into());
    if cli.debug {
        tracing_config = tracing_config.with_level(Level::DEBUG).with_location(true);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let settings = Settings::from_env()?;

    match cli.command {
        Some(Command::Auth { redirect_uri }) => {
            commands::auth::run(&settings, redirect_uri.as_deref()).await
        }
        None => commands::server::run(settings).await,
    }
}
