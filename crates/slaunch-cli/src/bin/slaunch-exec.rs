//! Runs a program through the launch service and exits with its status.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    slaunch_cli::run_exec(std::env::args_os(), &mut stdout, &mut stderr)
}
