//! Starts a program through the launch service without waiting for it.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    slaunch_cli::run_open(std::env::args_os(), &mut stdout, &mut stderr)
}
