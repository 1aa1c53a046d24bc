pub mod assistant;
pub mod availability;
pub mod commands;
pub mod config;
pub mod extraction;
pub mod file_coordination;
pub mod filing;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod taxonomy;

use clap::Parser;
use std::process::ExitCode;

use commands::{Cli, Command};
use config::Settings;

pub fn run() -> ExitCode {
    // Load .env from the working directory, if present
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init_console();

    if let Err(e) = &dotenv {
        if !e.not_found() {
            tracing::warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    let settings = cli.settings.apply(Settings::from_env());
    tracing::debug!("Settings: {:?}", settings);

    let command = cli.command.unwrap_or(Command::Sort);

    // Strictly sequential: one document at a time on a single thread
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return startup_failure(&command);
        }
    };

    runtime.block_on(commands::dispatch(command, &settings))
}

/// Exit code when a command cannot even start. Sort runs always exit 0.
fn startup_failure(command: &Command) -> ExitCode {
    match command {
        Command::Sort => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
