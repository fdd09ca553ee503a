//! Error types for request handling and the service lifecycle.

use std::io;

use thiserror::Error;

use slaunch_config::ConfigError;

use crate::spawner::SpawnError;
use crate::telemetry::TelemetryError;
use crate::watcher::WatchError;

/// Failure of a single launch request. Never affects other requests.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The child could not be started.
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    /// The child started but its exit could not be observed.
    #[error(transparent)]
    Watch(#[from] WatchError),
    /// The request was dropped without a reply.
    #[error("request was abandoned before a reply was produced")]
    Abandoned,
}

/// Fatal errors that terminate the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The async runtime could not be built.
    #[error("failed to build the service runtime: {source}")]
    Runtime {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Connecting to the session bus or serving the interface failed.
    #[error("failed to connect to the session bus: {source}")]
    Connect {
        /// Underlying bus error.
        #[source]
        source: zbus::Error,
    },
    /// A bus operation failed after connecting.
    #[error("session bus error: {source}")]
    Bus {
        /// Underlying bus error.
        #[source]
        source: zbus::Error,
    },
    /// The well-known name could not be acquired.
    #[error("could not acquire bus name '{name}': {reason}")]
    NameUnavailable {
        /// Requested name.
        name: String,
        /// Why acquisition failed.
        reason: String,
    },
    /// The well-known name was lost while serving.
    #[error("lost bus name '{name}'")]
    NameLost {
        /// The lost name.
        name: String,
    },
    /// Termination signal handlers could not be installed.
    #[error("failed to install signal handlers: {source}")]
    Signals {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
