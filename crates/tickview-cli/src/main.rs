mod cli;
mod commands;
mod error;

use std::process::ExitCode;

use clap::Parser;
use tickview_core::config::load_dotenv;
use tickview_core::{telemetry, AppConfig};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    load_dotenv();
    let cli = Cli::parse();
    let config = cli.apply(AppConfig::from_env()?);

    telemetry::init(&config.log_level);
    config.log();

    commands::run(&cli, &config).await
}
