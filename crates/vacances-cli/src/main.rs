//! vacances CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use vacances_cli::cli::{Cli, Command, ConfigAction};
use vacances_cli::commands;
use vacances_cli::config::CliConfig;
use vacances_cli::error::CliResult;
use vacances_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing = match &cli.command {
        _ if cli.debug => TracingConfig::cli_debug(),
        Command::Run { log_json: true } => TracingConfig::daemon(),
        Command::Run { log_json: false } => {
            TracingConfig::default().with_level(tracing::Level::INFO)
        }
        _ => TracingConfig::default(),
    };
    if let Err(e) = init_tracing(tracing) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(CliConfig::default_path);

    match cli.command {
        Command::Zones => commands::zones::zones(),
        Command::Config { action } => match action {
            ConfigAction::Path => commands::config::path(&config_path),
            ConfigAction::Dump => {
                let config = CliConfig::load_or_default(cli.config.as_deref())?;
                commands::config::dump(&config, &config_path)
            }
            ConfigAction::Validate => {
                let config = CliConfig::load_or_default(cli.config.as_deref())?;
                commands::config::validate(&config)
            }
        },
        Command::Status(ref args) => {
            let config = CliConfig::load_or_default(cli.config.as_deref())?;
            commands::status::status(args, &config).await
        }
        Command::Run { .. } => {
            let config = CliConfig::load_or_default(cli.config.as_deref())?;
            commands::run::run(cli.config, config).await
        }
    }
}
