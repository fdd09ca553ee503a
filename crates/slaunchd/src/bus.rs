//! The D-Bus face of the dispatcher.

use std::sync::Arc;

use slaunch_daemon_types::LaunchRequest;

use crate::dispatch::RequestDispatcher;
use crate::errors::LaunchError;
use crate::reply::LaunchReply;
use crate::spawner::SpawnError;

/// Error replies sent to callers. Variant names become the D-Bus error names
/// under `simonbru.SessionLaunch.Error`.
#[derive(Debug, zbus::DBusError)]
#[zbus(prefix = "simonbru.SessionLaunch.Error")]
pub enum LaunchBusError {
    /// Transport-level failure raised by the bus library.
    #[zbus(error)]
    ZBus(zbus::Error),
    /// The executable was not found on the search path.
    NotFound(String),
    /// The executable could not be executed.
    PermissionDenied(String),
    /// The working directory is missing or not a directory.
    InvalidWorkdir(String),
    /// Any other spawn or wait failure.
    Unknown(String),
}

impl From<LaunchError> for LaunchBusError {
    fn from(error: LaunchError) -> Self {
        let message = error.to_string();
        match error {
            LaunchError::Spawn(SpawnError::NotFound { .. }) => Self::NotFound(message),
            LaunchError::Spawn(SpawnError::PermissionDenied { .. }) => {
                Self::PermissionDenied(message)
            }
            LaunchError::Spawn(SpawnError::InvalidWorkdir { .. }) => Self::InvalidWorkdir(message),
            LaunchError::Spawn(_) | LaunchError::Watch(_) | LaunchError::Abandoned => {
                Self::Unknown(message)
            }
        }
    }
}

/// Object served at the configured path.
#[derive(Debug)]
pub(crate) struct LaunchInterface {
    dispatcher: Arc<RequestDispatcher>,
}

impl LaunchInterface {
    pub(crate) const fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[zbus::interface(name = "simonbru.SessionLaunch")]
impl LaunchInterface {
    /// Runs `executable` in the service's working directory and replies with
    /// its exit status once it terminates.
    #[zbus(out_args("status"))]
    async fn exec(&self, executable: String, args: Vec<String>) -> Result<i32, LaunchBusError> {
        let handle = self.dispatcher.submit(LaunchRequest::exec(executable, args));
        match handle.outcome().await? {
            LaunchReply::Exited { status, .. } => Ok(status),
            LaunchReply::Spawned { pid } => Err(LaunchBusError::Unknown(format!(
                "process {pid} was detached instead of watched"
            ))),
        }
    }

    /// Starts `executable` in `workdir` and replies once it is running.
    async fn open(
        &self,
        workdir: String,
        executable: String,
        args: Vec<String>,
    ) -> Result<(), LaunchBusError> {
        let handle = self
            .dispatcher
            .submit(LaunchRequest::open(workdir, executable, args));
        handle.outcome().await?;
        Ok(())
    }
}
