//! calfeed CLI entry point.

use std::process::ExitCode;

use calfeed_core::init_tracing;
use clap::Parser;

use calfeed_client::cli::{Cli, Command, ConfigAction};
use calfeed_client::commands::events::RunSettings;
use calfeed_client::config::ClientConfig;
use calfeed_client::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => return report(e),
    };

    // Initialize tracing
    if let Err(e) = init_tracing(cli.tracing_config(config.debug)) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(e),
    }
}

fn report(err: ClientError) -> ExitCode {
    eprintln!("{}: {}", err.kind(), err);
    ExitCode::FAILURE
}

async fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    match &cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => calfeed_client::commands::config::dump(config),
            ConfigAction::Path => calfeed_client::commands::config::path(),
        },
        None => {
            let settings = RunSettings::resolve(cli, config)?;
            calfeed_client::commands::events::show(&settings, cli.output_format()).await
        }
    }
}
