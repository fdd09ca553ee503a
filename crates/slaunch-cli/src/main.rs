//! Launch client that picks its mode from the name it was invoked under.
//!
//! Installed or symlinked as a name containing `exec` it behaves like
//! `slaunch-exec`; under any other name it behaves like `slaunch-open`.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    slaunch_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
