//! Session launch service.
//!
//! The daemon claims a well-known name on the session bus and starts programs
//! on behalf of clients that cannot do so themselves, for example processes
//! confined to a sandbox or a separate namespace. Children inherit the
//! service's environment, so they see the user's display and session bus.
//!
//! Two interaction modes are supported:
//!
//! - **Exec** spawns the program in the service's working directory and
//!   replies with its exit status once it terminates.
//! - **Open** spawns the program in a caller-supplied directory and replies
//!   as soon as the spawn succeeds.
//!
//! ## Concurrency
//!
//! Everything runs on a single-threaded `tokio` runtime. An `Exec` request
//! does not block the loop between spawn and exit: the [`ExitWatcher`] parks
//! a one-shot continuation per child and the loop keeps serving other calls
//! and other exits meanwhile. Each request owns exactly one [`PendingReply`],
//! which is consumed by the single reply it produces.

mod activity;
mod bus;
mod dispatch;
mod errors;
mod health;
mod reply;
mod service;
mod spawner;
pub mod telemetry;
mod watcher;

use slaunch_config::Config;

pub use activity::{ActivityGuard, ActivityTracker};
pub use bus::LaunchBusError;
pub use dispatch::RequestDispatcher;
pub use errors::{LaunchError, ServiceError};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use reply::{LaunchReply, PendingReply, ReplyHandle, ReplyOutcome};
pub use service::ServiceLoop;
pub use spawner::{ProcessSpawner, SpawnCommand, SpawnError, SpawnedProcess, SystemSpawner};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use watcher::{ExitWatcher, WatchError, WatchOutcome, termination_status};

/// Runs the service until shutdown, the idle timeout, or a fatal error.
///
/// Installs telemetry, builds a current-thread runtime, and drives a
/// [`ServiceLoop`] on it.
///
/// # Errors
///
/// Returns [`ServiceError`] when telemetry cannot be installed, the runtime
/// cannot be built, or the service loop fails.
pub fn run_service(config: Config) -> Result<(), ServiceError> {
    telemetry::initialise(&config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| ServiceError::Runtime { source })?;
    runtime.block_on(ServiceLoop::new(config).run())
}

#[cfg(test)]
mod tests;
