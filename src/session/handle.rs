use std::sync::{Arc, Weak};

use tokio::sync::Notify;

/// Cancellation state shared between a session task and its handles.
///
/// The session task holds the only strong reference; handle liveness is
/// exactly "the task has not finished". `notify_one` stores a permit, so a
/// terminate issued between two suspension points is still observed at the
/// next one.
pub(crate) struct SessionShared {
    cancel: Notify,
}

impl SessionShared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            cancel: Notify::new(),
        })
    }

    pub(crate) fn trigger_cancel(&self) {
        self.cancel.notify_one();
    }

    pub(crate) async fn cancelled(&self) {
        self.cancel.notified().await;
    }
}

/// Weak observer of a session's lifetime with a terminate capability.
///
/// Holding a handle never extends the session's life. Both operations are
/// safe to call from any thread, any number of times.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Weak<SessionShared>,
}

impl SessionHandle {
    pub(crate) fn new(shared: Weak<SessionShared>) -> Self {
        Self { shared }
    }

    /// Whether the owning session task is still running.
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }

    /// Asks the session to cancel its outstanding socket operation and shut
    /// the connection down. Idempotent; a no-op once the session is gone.
    pub fn terminate(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.trigger_cancel();
        }
    }
}
