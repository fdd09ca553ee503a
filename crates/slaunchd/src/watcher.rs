//! Exit notification for tracked children.
//!
//! Each watch owns its child and a one-shot continuation. The wait runs as a
//! task on the service runtime, so the loop stays free to serve other calls
//! while any number of children are outstanding. The registry only records
//! which pids are watched; it never blocks a wait.

use std::collections::HashSet;
use std::io;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::debug;

use crate::dispatch::DISPATCH_TARGET;
use crate::spawner::SpawnedProcess;

/// Status delivered to a watch continuation.
pub type WatchOutcome = Result<i32, WatchError>;

/// Reasons a watch could not observe an exit status.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The process was spawned without exit tracking.
    #[error("process {pid} was not spawned for exit tracking")]
    Untracked {
        /// Process identifier.
        pid: u32,
    },
    /// Another watch already owns this pid.
    #[error("process {pid} is already being watched")]
    AlreadyWatched {
        /// Process identifier.
        pid: u32,
    },
    /// Waiting for the process failed.
    #[error("failed to wait for process {pid}: {source}")]
    Wait {
        /// Process identifier.
        pid: u32,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// Delivers each tracked child's termination status exactly once.
#[derive(Debug, Clone, Default)]
pub struct ExitWatcher {
    watched: Arc<Mutex<HashSet<u32>>>,
}

impl ExitWatcher {
    /// Creates a watcher with no outstanding watches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `continuation` to run once `process` terminates.
    ///
    /// The continuation is invoked exactly once. Registration failures are
    /// delivered to it immediately instead of being returned, so callers have
    /// a single completion path. Must be called from within the service
    /// runtime.
    pub fn watch<F>(&self, process: SpawnedProcess, continuation: F)
    where
        F: FnOnce(WatchOutcome) + Send + 'static,
    {
        let pid = process.pid();
        let Some(mut child) = process.into_child() else {
            continuation(Err(WatchError::Untracked { pid }));
            return;
        };
        if !self.registry().insert(pid) {
            continuation(Err(WatchError::AlreadyWatched { pid }));
            return;
        }

        let watched = Arc::clone(&self.watched);
        tokio::spawn(async move {
            let outcome = child
                .wait()
                .await
                .map(termination_status)
                .map_err(|source| WatchError::Wait { pid, source });
            watched
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&pid);
            debug!(target: DISPATCH_TARGET, pid, outcome = ?outcome, "watched process finished");
            continuation(outcome);
        });
    }

    /// Number of watches still waiting for their process to exit.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.registry().len()
    }

    fn registry(&self) -> MutexGuard<'_, HashSet<u32>> {
        self.watched.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Folds an exit status into a single integer.
///
/// A normal exit yields its code. A process killed by signal `N` yields
/// `128 + N`, as shells report it. Anything else yields `1`.
#[must_use]
pub fn termination_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    signal_status(status).unwrap_or(1)
}

#[cfg(unix)]
fn signal_status(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;

    status.signal().map(|signal| 128 + signal)
}

#[cfg(not(unix))]
fn signal_status(_status: ExitStatus) -> Option<i32> {
    None
}
