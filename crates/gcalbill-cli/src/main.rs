//! gcalbill CLI entry point.

use std::process::ExitCode;

use chrono::Local;
use clap::Parser;

use gcalbill_cli::cli::{Cli, Command, ConfigAction};
use gcalbill_cli::commands;
use gcalbill_cli::config::{ClientConfig, ReportConfig};
use gcalbill_cli::error::ClientResult;
use gcalbill_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(TracingConfig::cli(cli.debug)) {
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
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let file = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };

    match cli.command {
        Some(Command::Config { ref action }) => match action {
            ConfigAction::Dump => commands::config::dump(&file, &config_path),
            ConfigAction::Path => commands::config::path(&config_path),
        },
        Some(Command::Auth { force }) => {
            let config = ReportConfig::resolve(&cli, &file, Local::now().date_naive())?;
            commands::auth::run(&config, force).await
        }
        None => {
            let config = ReportConfig::resolve(&cli, &file, Local::now().date_naive())?;
            commands::report::run(&config).await
        }
    }
}
