//! A cloneable handle for poking the session from external code.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;

/// A cloneable handle for stopping the in-flight response and observing
/// whether one is running.
///
/// All fields are `Arc`-wrapped, so cloning is cheap. The token is replaced
/// at the start of every turn; a stop request only ever affects the turn that
/// is streaming when it lands.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) cancel: Arc<Mutex<CancellationToken>>,
    pub(crate) idle_notify: Arc<tokio::sync::Notify>,
    pub(crate) is_running: Arc<AtomicBool>,
}

impl SessionHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            idle_notify: Arc::new(tokio::sync::Notify::new()),
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request that the current response stop streaming.
    ///
    /// Cooperative: the session observes this at its next suspension point,
    /// commits what it has, and goes idle. A no-op when nothing is streaming.
    pub fn stop(&self) {
        self.cancel.lock().cancel();
    }

    /// Whether a response is currently streaming.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// Wait until the session goes idle (finishes or is stopped).
    pub async fn wait_for_idle(&self) {
        let notified = self.idle_notify.notified();
        if !self.is_running.load(Ordering::Acquire) {
            return;
        }
        notified.await;
    }

    /// Install a fresh token and mark the session running.
    pub(crate) fn begin_turn(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        *self.cancel.lock() = fresh.clone();
        self.is_running.store(true, Ordering::Release);
        fresh
    }

    /// Mark the session idle and wake anyone waiting on it.
    pub(crate) fn finish_turn(&self) {
        self.is_running.store(false, Ordering::Release);
        self.idle_notify.notify_waiters();
    }
}
