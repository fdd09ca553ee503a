//! Client tools for the session launch service.
//!
//! `slaunch-exec` asks the service to run a program and exits with the
//! program's status once it finishes. `slaunch-open` asks the service to start
//! a program in a working directory and exits as soon as it is running. Both
//! are thin: parse arguments, make one call on the session bus, and turn the
//! reply into an exit code.
//!
//! Exit codes:
//!
//! | Outcome | Code |
//! |---------|------|
//! | Exec completed | the remote status, or 1 when it does not fit `0..=255` |
//! | Open acknowledged | 0 |
//! | Usage or configuration error | 2 |
//! | Local setup failure | [`EXIT_SETUP_FAILURE`] |
//! | Call failure, error reply or timeout | [`EXIT_CALL_FAILURE`] |

mod cli;
mod errors;
mod transport;

use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;

use slaunch_config::{Config, ConfigArgs};
use slaunch_daemon_types::{LaunchMode, LaunchRequest};

use cli::{ExecCli, OpenCli, split_command};
use errors::{AppError, exit_code_from_status};
use transport::{CallReply, LaunchTransport, SessionBusTransport};

pub use errors::{EXIT_CALL_FAILURE, EXIT_SETUP_FAILURE};

/// Runs the client in the mode implied by the program name in `args`.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let mode = args
        .first()
        .map_or(LaunchMode::Open, |program| mode_for_program(program));
    run_with_transport(mode, args, stdout, stderr, &SessionBusTransport)
}

/// Runs the Exec client.
#[must_use]
pub fn run_exec<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_transport(
        LaunchMode::Exec,
        args.into_iter().collect(),
        stdout,
        stderr,
        &SessionBusTransport,
    )
}

/// Runs the Open client.
#[must_use]
pub fn run_open<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_transport(
        LaunchMode::Open,
        args.into_iter().collect(),
        stdout,
        stderr,
        &SessionBusTransport,
    )
}

/// Picks the mode for a program name: names containing `exec` select Exec.
#[must_use]
pub fn mode_for_program(program: &OsStr) -> LaunchMode {
    let name = Path::new(program).file_name().unwrap_or(program);
    if name.to_string_lossy().contains("exec") {
        LaunchMode::Exec
    } else {
        LaunchMode::Open
    }
}

fn run_with_transport<W, E, T>(
    mode: LaunchMode,
    args: Vec<OsString>,
    stdout: &mut W,
    stderr: &mut E,
    transport: &T,
) -> ExitCode
where
    W: Write,
    E: Write,
    T: LaunchTransport,
{
    let tool = tool_name(mode, &args);
    match launch(mode, args, transport) {
        Ok(CallReply::Status(status)) => exit_code_from_status(status),
        Ok(CallReply::Acknowledged) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) => {
            let rendered = error.render();
            let _ = if error.use_stderr() {
                write!(stderr, "{rendered}")
            } else {
                write!(stdout, "{rendered}")
            };
            AppError::CliUsage(error).exit_code()
        }
        Err(error) => {
            let _ = writeln!(stderr, "{tool}: {error}");
            error.exit_code()
        }
    }
}

fn launch<T: LaunchTransport>(
    mode: LaunchMode,
    args: Vec<OsString>,
    transport: &T,
) -> Result<CallReply, AppError> {
    let (config_args, request) = parse_request(mode, args)?;
    let config = Config::from_args(config_args)?;
    transport.call(&config, &request)
}

fn parse_request(
    mode: LaunchMode,
    args: Vec<OsString>,
) -> Result<(ConfigArgs, LaunchRequest), AppError> {
    match mode {
        LaunchMode::Exec => {
            let cli = ExecCli::try_parse_from(args).map_err(AppError::CliUsage)?;
            let (executable, arguments) =
                split_command(cli.command).ok_or(AppError::MissingExecutable)?;
            Ok((cli.config, LaunchRequest::exec(executable, arguments)))
        }
        LaunchMode::Open => {
            let cli = OpenCli::try_parse_from(args).map_err(AppError::CliUsage)?;
            let (executable, arguments) =
                split_command(cli.command).ok_or(AppError::MissingExecutable)?;
            let workdir = resolve_workdir(cli.workdir)?;
            Ok((
                cli.config,
                LaunchRequest::open(workdir, executable, arguments),
            ))
        }
    }
}

/// Anchors the working directory to the client's current directory, since
/// the service resolves relative paths against its own.
fn resolve_workdir(requested: Option<Utf8PathBuf>) -> Result<Utf8PathBuf, AppError> {
    match requested {
        Some(path) if path.is_absolute() => Ok(path),
        Some(path) => Ok(current_dir()?.join(path)),
        None => current_dir(),
    }
}

fn current_dir() -> Result<Utf8PathBuf, AppError> {
    let path = std::env::current_dir().map_err(|source| AppError::CurrentDir { source })?;
    Utf8PathBuf::from_path_buf(path).map_err(|path| AppError::NonUtf8Workdir { path })
}

fn tool_name(mode: LaunchMode, args: &[OsString]) -> String {
    args.first()
        .and_then(|program| Path::new(program).file_name())
        .map_or_else(
            || format!("slaunch-{mode}"),
            |name| name.to_string_lossy().into_owned(),
        )
}

#[cfg(test)]
mod tests;
