//! Argument parsers for the two client modes.

use camino::Utf8PathBuf;
use clap::Parser;

use slaunch_config::ConfigArgs;

/// Runs a program through the launch service and exits with its status.
#[derive(Debug, Parser)]
#[command(name = "slaunch-exec", version)]
pub(crate) struct ExecCli {
    #[command(flatten)]
    pub(crate) config: ConfigArgs,
    /// Program to run, followed by its arguments.
    #[arg(
        value_name = "EXECUTABLE",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub(crate) command: Vec<String>,
}

/// Starts a program through the launch service without waiting for it.
#[derive(Debug, Parser)]
#[command(name = "slaunch-open", version)]
pub(crate) struct OpenCli {
    #[command(flatten)]
    pub(crate) config: ConfigArgs,
    /// Working directory for the program. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub(crate) workdir: Option<Utf8PathBuf>,
    /// Program to start, followed by its arguments.
    #[arg(
        value_name = "EXECUTABLE",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub(crate) command: Vec<String>,
}

/// Splits a command line into the executable and its arguments.
pub(crate) fn split_command(mut command: Vec<String>) -> Option<(String, Vec<String>)> {
    if command.is_empty() {
        return None;
    }
    let executable = command.remove(0);
    Some((executable, command))
}
