//! Error types and exit-code mapping for the client tools.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

use slaunch_config::ConfigError;

/// Exit code for failures before any call was attempted.
pub const EXIT_SETUP_FAILURE: u8 = 111;

/// Exit code for failures while calling the service.
pub const EXIT_CALL_FAILURE: u8 = 222;

/// Exit code for invalid configuration values, matching clap usage errors.
const EXIT_USAGE: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no executable given")]
    MissingExecutable,
    #[error("failed to determine the current directory: {source}")]
    CurrentDir {
        #[source]
        source: io::Error,
    },
    #[error("working directory '{}' is not valid UTF-8", .path.display())]
    NonUtf8Workdir { path: PathBuf },
    #[error("failed to build the client runtime: {source}")]
    Runtime {
        #[source]
        source: io::Error,
    },
    #[error("failed to connect to the session bus: {source}")]
    Connect {
        #[source]
        source: zbus::Error,
    },
    #[error("no reply from the launch service within {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("launch service replied with {name}: {message}")]
    Remote { name: String, message: String },
    #[error("call to the launch service failed: {source}")]
    Call {
        #[source]
        source: zbus::Error,
    },
    #[error("malformed reply from the launch service: {source}")]
    Decode {
        #[source]
        source: zbus::Error,
    },
}

impl AppError {
    /// Classifies a failed method call.
    pub(crate) fn from_call(error: zbus::Error) -> Self {
        match error {
            zbus::Error::MethodError(name, detail, _) => Self::Remote {
                name: name.to_string(),
                message: detail.unwrap_or_default(),
            },
            source => Self::Call { source },
        }
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::CliUsage(error) => exit_code_from_status(error.exit_code()),
            Self::Config(_) | Self::MissingExecutable => ExitCode::from(EXIT_USAGE),
            Self::CurrentDir { .. } | Self::NonUtf8Workdir { .. } | Self::Runtime { .. } => {
                ExitCode::from(EXIT_SETUP_FAILURE)
            }
            Self::Connect { .. }
            | Self::Timeout { .. }
            | Self::Remote { .. }
            | Self::Call { .. }
            | Self::Decode { .. } => ExitCode::from(EXIT_CALL_FAILURE),
        }
    }
}

/// Maps a remote status onto a process exit code.
///
/// Statuses outside `0..=255` cannot be represented and become a generic
/// failure.
pub(crate) fn exit_code_from_status(status: i32) -> ExitCode {
    u8::try_from(status).map_or(ExitCode::FAILURE, ExitCode::from)
}
