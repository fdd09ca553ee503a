//! Starting child processes on behalf of launch requests.
//!
//! The executable is resolved against the search path, the argument vector is
//! passed through untouched, and the child inherits the service's environment.
//! Children spawned without exit tracking are handed back to the runtime,
//! which reaps them in the background.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tokio::process::{Child, Command};

/// Parameters for a single spawn.
#[derive(Debug, Clone, Copy)]
pub struct SpawnCommand<'a> {
    executable: &'a str,
    args: &'a [String],
    workdir: Option<&'a Utf8Path>,
    track_exit: bool,
}

impl<'a> SpawnCommand<'a> {
    /// Spawns `executable` with `args` in the service's working directory.
    #[must_use]
    pub const fn new(executable: &'a str, args: &'a [String]) -> Self {
        Self {
            executable,
            args,
            workdir: None,
            track_exit: false,
        }
    }

    /// Runs the child in `workdir` instead of the service's directory.
    #[must_use]
    pub const fn in_dir(mut self, workdir: &'a Utf8Path) -> Self {
        self.workdir = Some(workdir);
        self
    }

    /// Keeps the child's exit status retrievable through the exit watcher.
    #[must_use]
    pub const fn tracked(mut self) -> Self {
        self.track_exit = true;
        self
    }

    /// Program name to resolve.
    #[must_use]
    pub const fn executable(&self) -> &'a str {
        self.executable
    }

    /// Arguments after the program name.
    #[must_use]
    pub const fn args(&self) -> &'a [String] {
        self.args
    }

    /// Explicit working directory, if any.
    #[must_use]
    pub const fn workdir(&self) -> Option<&'a Utf8Path> {
        self.workdir
    }

    /// Whether the exit status must stay retrievable.
    #[must_use]
    pub const fn track_exit(&self) -> bool {
        self.track_exit
    }
}

/// A freshly started child.
#[derive(Debug)]
pub struct SpawnedProcess {
    pid: u32,
    child: Option<Child>,
}

impl SpawnedProcess {
    /// Wraps a child whose exit will be observed.
    #[must_use]
    pub const fn tracked(pid: u32, child: Child) -> Self {
        Self {
            pid,
            child: Some(child),
        }
    }

    /// Records a child that has been handed to the runtime for reaping.
    #[must_use]
    pub const fn detached(pid: u32) -> Self {
        Self { pid, child: None }
    }

    /// Operating system process identifier.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether the exit status can still be collected.
    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        self.child.is_some()
    }

    pub(crate) fn into_child(self) -> Option<Child> {
        self.child
    }
}

/// Errors raised before a child could be started.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The executable does not exist on the search path.
    #[error("executable '{executable}' not found: {source}")]
    NotFound {
        /// Requested program name.
        executable: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The executable exists but may not be executed.
    #[error("permission denied executing '{executable}': {source}")]
    PermissionDenied {
        /// Requested program name.
        executable: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The working directory is missing or not a directory.
    #[error("invalid working directory '{path}': {reason}")]
    InvalidWorkdir {
        /// Requested working directory.
        path: Utf8PathBuf,
        /// Why the directory was rejected.
        reason: String,
    },
    /// The OS refused the spawn for another reason.
    #[error("failed to spawn '{executable}': {source}")]
    Io {
        /// Requested program name.
        executable: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The child exited before its identifier could be read.
    #[error("'{executable}' exited before its pid was recorded")]
    MissingPid {
        /// Requested program name.
        executable: String,
    },
}

impl SpawnError {
    fn from_io(executable: &str, source: io::Error) -> Self {
        let executable = executable.to_owned();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { executable, source },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { executable, source },
            _ => Self::Io { executable, source },
        }
    }
}

/// Starts child processes.
pub trait ProcessSpawner: Send + Sync {
    /// Starts the described child.
    ///
    /// Must be called from within the service runtime.
    fn spawn(&self, command: &SpawnCommand<'_>) -> Result<SpawnedProcess, SpawnError>;
}

/// Spawner backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl ProcessSpawner for SystemSpawner {
    fn spawn(&self, command: &SpawnCommand<'_>) -> Result<SpawnedProcess, SpawnError> {
        if let Some(workdir) = command.workdir() {
            check_workdir(workdir)?;
        }

        let mut child_command = Command::new(command.executable());
        child_command.args(command.args());
        if let Some(workdir) = command.workdir() {
            child_command.current_dir(workdir.as_std_path());
        }

        let child = child_command
            .spawn()
            .map_err(|source| SpawnError::from_io(command.executable(), source))?;
        let pid = child.id().ok_or_else(|| SpawnError::MissingPid {
            executable: command.executable().to_owned(),
        })?;

        if command.track_exit() {
            Ok(SpawnedProcess::tracked(pid, child))
        } else {
            // Dropping a tokio child without `kill_on_drop` leaves it running
            // and queues it for background reaping.
            drop(child);
            Ok(SpawnedProcess::detached(pid))
        }
    }
}

fn check_workdir(workdir: &Utf8Path) -> Result<(), SpawnError> {
    let invalid = |reason: String| SpawnError::InvalidWorkdir {
        path: workdir.to_path_buf(),
        reason,
    };
    let metadata = fs::metadata(workdir).map_err(|error| invalid(error.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid(String::from("not a directory")));
    }
    // Resolving `dir/.` needs search permission on `dir`, as the child's chdir does.
    fs::metadata(workdir.join(".")).map_err(|error| invalid(format!("not searchable: {error}")))?;
    Ok(())
}
