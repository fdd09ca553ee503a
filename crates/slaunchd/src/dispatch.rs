//! Request dispatch: interpret the mode, spawn, and wire the exit to the reply.

use std::sync::Arc;

use tracing::{info, warn};

use slaunch_daemon_types::LaunchRequest;

use crate::activity::ActivityTracker;
use crate::errors::LaunchError;
use crate::reply::{LaunchReply, PendingReply, ReplyHandle};
use crate::spawner::{ProcessSpawner, SpawnCommand};
use crate::watcher::ExitWatcher;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes launch requests to the spawner and the exit watcher.
///
/// The dispatcher never waits on a child itself. `Open` replies as soon as
/// the spawn succeeds; `Exec` parks its reply with the [`ExitWatcher`], which
/// resolves it once the child terminates.
#[derive(Clone)]
pub struct RequestDispatcher {
    spawner: Arc<dyn ProcessSpawner>,
    watcher: ExitWatcher,
    activity: ActivityTracker,
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("watcher", &self.watcher)
            .field("activity", &self.activity)
            .finish_non_exhaustive()
    }
}

impl RequestDispatcher {
    /// Builds a dispatcher around `spawner`.
    #[must_use]
    pub fn new(spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self {
            spawner,
            watcher: ExitWatcher::new(),
            activity: ActivityTracker::new(),
        }
    }

    /// In-flight request accounting.
    #[must_use]
    pub const fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    /// Watcher holding the outstanding `Exec` children.
    #[must_use]
    pub const fn watcher(&self) -> &ExitWatcher {
        &self.watcher
    }

    /// Accepts `request` and returns the handle its reply arrives on.
    ///
    /// Must be called from within the service runtime.
    pub fn submit(&self, request: LaunchRequest) -> ReplyHandle {
        let (reply, handle) = PendingReply::tracked(self.activity.begin());
        self.dispatch(request, reply);
        handle
    }

    /// Handles `request`, consuming `reply` exactly once.
    ///
    /// Spawn failures resolve the reply immediately. Must be called from
    /// within the service runtime.
    pub fn dispatch(&self, request: LaunchRequest, reply: PendingReply) {
        info!(
            target: DISPATCH_TARGET,
            mode = %request.mode(),
            executable = request.executable(),
            args = ?request.args(),
            workdir = ?request.workdir(),
            "launch request accepted"
        );
        match request {
            LaunchRequest::Open {
                workdir,
                executable,
                args,
            } => {
                let command = SpawnCommand::new(&executable, &args).in_dir(&workdir);
                let outcome = self
                    .spawner
                    .spawn(&command)
                    .map(|process| LaunchReply::Spawned { pid: process.pid() })
                    .map_err(LaunchError::from);
                finish(&executable, reply, outcome);
            }
            LaunchRequest::Exec { executable, args } => {
                let command = SpawnCommand::new(&executable, &args).tracked();
                match self.spawner.spawn(&command) {
                    Ok(process) => {
                        let pid = process.pid();
                        info!(target: DISPATCH_TARGET, pid, executable = %executable, "process started");
                        self.watcher.watch(process, move |outcome| {
                            let outcome = outcome
                                .map(|status| LaunchReply::Exited { pid, status })
                                .map_err(LaunchError::from);
                            finish(&executable, reply, outcome);
                        });
                    }
                    Err(error) => finish(&executable, reply, Err(error.into())),
                }
            }
        }
    }
}

fn finish(executable: &str, reply: PendingReply, outcome: Result<LaunchReply, LaunchError>) {
    match &outcome {
        Ok(LaunchReply::Spawned { pid }) => {
            info!(target: DISPATCH_TARGET, pid, executable, "process detached");
        }
        Ok(LaunchReply::Exited { pid, status }) => {
            info!(target: DISPATCH_TARGET, pid, status, executable, "process exited");
        }
        Err(error) => {
            warn!(target: DISPATCH_TARGET, executable, error = %error, "launch request failed");
        }
    }
    if !reply.resolve(outcome) {
        warn!(target: DISPATCH_TARGET, executable, "caller went away before the reply");
    }
}
