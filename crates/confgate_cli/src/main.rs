//! confgate CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: Rules failed or files were rejected

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod error;
mod extract;
mod settings;

use commands::{Cli, Commands};
use error::ViolationsFound;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const VIOLATIONS: u8 = 2;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Test(args) => commands::test::execute(args, cli.verbose).await,
        Commands::ValidatePolicy(args) => commands::validate_policy::execute(args).await,
        Commands::Rules(args) => commands::rules::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            if exit_code == ExitCodes::ERROR {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr; stdout carries the report.
fn init_logging(verbose: bool) {
    let default_directives = if verbose {
        "confgate=debug,warn"
    } else {
        "confgate=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<ViolationsFound>().is_some() {
        ExitCodes::VIOLATIONS
    } else {
        ExitCodes::ERROR
    }
}
