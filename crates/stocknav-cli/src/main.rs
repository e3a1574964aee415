mod cli;
mod commands;
mod error;
mod metadata;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "stocknav=warn";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    if matches!(cli.command, Command::Shell) {
        commands::shell::run(&cli).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let envelope = commands::run(&cli).await?;
    output::render(&envelope, cli.format, cli.pretty)?;

    if cli.strict && (!envelope.meta.warnings.is_empty() || !envelope.errors.is_empty()) {
        return Err(CliError::StrictModeViolation {
            warning_count: envelope.meta.warnings.len(),
            error_count: envelope.errors.len(),
        });
    }

    if !envelope.errors.is_empty() {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}

/// Logs go to stderr so stdout stays a clean envelope stream.
fn init_tracing(cli: &Cli) -> Result<(), CliError> {
    let filter = match cli.log_level.as_deref() {
        Some(level) => {
            let directive = if level.contains('=') || level.contains(',') {
                level.to_owned()
            } else {
                format!("stocknav={level}")
            };
            EnvFilter::try_new(directive)
                .map_err(|error| CliError::Command(format!("invalid --log-level: {error}")))?
        }
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    let installed = if cli.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        eprintln!("warning: a tracing subscriber was already installed");
    }
    Ok(())
}
