//! Single-use reply handles.

use tokio::sync::oneshot;

use crate::activity::ActivityGuard;
use crate::errors::LaunchError;

/// Successful resolution of a launch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchReply {
    /// The child was started and is no longer tracked.
    Spawned {
        /// Process identifier of the child.
        pid: u32,
    },
    /// The child terminated with `status`.
    Exited {
        /// Process identifier of the child.
        pid: u32,
        /// Folded termination status.
        status: i32,
    },
}

/// What a request finally resolved to.
pub type ReplyOutcome = Result<LaunchReply, LaunchError>;

/// The right to answer one in-flight request.
///
/// Resolving consumes the handle, so a request cannot be answered twice.
/// Dropping it unresolved is observed by the waiting side as
/// [`LaunchError::Abandoned`].
#[derive(Debug)]
pub struct PendingReply {
    sender: oneshot::Sender<ReplyOutcome>,
    _activity: Option<ActivityGuard>,
}

impl PendingReply {
    /// Creates a reply handle and the side that awaits it.
    #[must_use]
    pub fn channel() -> (Self, ReplyHandle) {
        Self::with_activity(None)
    }

    /// Like [`PendingReply::channel`], counting the request as in flight until
    /// it is resolved or dropped.
    #[must_use]
    pub fn tracked(activity: ActivityGuard) -> (Self, ReplyHandle) {
        Self::with_activity(Some(activity))
    }

    fn with_activity(activity: Option<ActivityGuard>) -> (Self, ReplyHandle) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender,
                _activity: activity,
            },
            ReplyHandle { receiver },
        )
    }

    /// Sends the outcome. Returns `false` when nobody is waiting any more.
    pub fn resolve(self, outcome: ReplyOutcome) -> bool {
        self.sender.send(outcome).is_ok()
    }
}

/// Awaits the outcome of one request.
#[derive(Debug)]
pub struct ReplyHandle {
    receiver: oneshot::Receiver<ReplyOutcome>,
}

impl ReplyHandle {
    /// Waits for the request to resolve.
    pub async fn outcome(self) -> ReplyOutcome {
        self.receiver
            .await
            .unwrap_or(Err(LaunchError::Abandoned))
    }
}
