//! fireman-calendar CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use fireman_client::cli::{Cli, Command, ConfigAction};
use fireman_client::commands;
use fireman_client::config::ClientConfig;
use fireman_client::error::{ClientError, ClientResult};
use fireman_core::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.tracing_config()) {
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
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path).map_err(ClientError::Config)?,
        None => ClientConfig::load().map_err(ClientError::Config)?,
    };
    cli.apply_overrides(&mut config);

    match &cli.command {
        Some(Command::Auth { force }) => commands::auth::run(&config, *force).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
        Some(Command::Events) | None => {
            commands::events::run(&config, cli.output_format(&config)).await
        }
    }
}
