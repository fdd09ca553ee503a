//! Entry point for the session launch service.
//!
//! Exits 0 after a clean shutdown and 1 when configuration, the bus
//! connection, or ownership of the well-known name fails.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use slaunch_config::{Config, ConfigArgs};

/// Session launch service: starts programs on behalf of session clients.
#[derive(Debug, Parser)]
#[command(name = "slaunchd", version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = Config::from_args(cli.config)
        .map_err(slaunchd::ServiceError::from)
        .and_then(slaunchd::run_service);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "slaunchd: {error}");
            ExitCode::FAILURE
        }
    }
}
