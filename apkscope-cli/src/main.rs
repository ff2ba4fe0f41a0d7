//! apkscope CLI entry point
//!
//! Parses arguments, loads configuration, initializes tracing and dispatches
//! to the subcommand handlers. Errors are printed to stderr and mapped to exit codes
//! by [`CliError::exit_code`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;

use clap::Parser;
use colored::Colorize;

use apkscope_core::config::ApkscopeConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let writer = OutputWriter::new(cli.output);

    if let Err(e) = run(cli, &writer).await {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, writer: &OutputWriter) -> Result<(), CliError> {
    let Cli {
        config: config_path,
        log_level,
        command,
        ..
    } = cli;

    match command {
        // config subcommands load (and report on) the file themselves
        Commands::Config(args) => commands::config::execute(args, &config_path, writer).await,
        command => {
            let config = load_config(&config_path, log_level.as_deref()).await?;
            if let Err(e) = logging::init_tracing(&config.general) {
                eprintln!("warning: {e}");
            }
            dispatch(command, &config_path, &config, writer).await
        }
    }
}

async fn dispatch(
    command: Commands,
    config_path: &Path,
    config: &ApkscopeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match command {
        Commands::Analyze(args) => commands::analyze::execute(args, config, writer).await,
        Commands::Projects => commands::projects::execute(config, writer).await,
        Commands::Findings(args) => commands::findings::execute(args, config, writer).await,
        Commands::Files => commands::files::execute(config, writer).await,
        Commands::Cat(args) => commands::cat::execute(args, config, writer).await,
        Commands::Wipe => commands::wipe::execute(config, writer).await,
        Commands::Config(args) => commands::config::execute(args, config_path, writer).await,
    }
}

/// Load `apkscope.toml` (defaults when missing), apply env overrides, then CLI flags.
async fn load_config(path: &Path, log_level: Option<&str>) -> Result<ApkscopeConfig, CliError> {
    let mut config = ApkscopeConfig::load_or_default(path).await?;
    if let Some(level) = log_level {
        config.general.log_level = level.to_owned();
        config.validate()?;
    }
    Ok(config)
}
