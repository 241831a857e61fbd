use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Error returned when a wait is abandoned because of cancellation.
///
/// Returned by [`AdmissionGate::acquire`](super::AdmissionGate::acquire)
/// when the caller's [`CancellationToken`] fires before a permit is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("task cancelled")]
pub struct Cancelled;

/// Token that signals cancellation to waiting tasks.
///
/// Cloning a token creates another handle to the same cancellation flag.
/// Calling [`cancel()`](CancellationToken::cancel) on any clone affects all,
/// and wakes every task parked in [`cancelled()`](CancellationToken::cancelled).
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

struct TokenInner {
    flag: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    /// Creates a new cancellation token (not cancelled).
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenInner {
                flag: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Signals cancellation.
    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Returns whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::Acquire)
    }

    /// Completes once the token is cancelled.
    ///
    /// Resolves immediately if the token is already cancelled.
    pub async fn cancelled(&self) {
        loop {
            let mut notified = pin!(self.inner.notify.notified());
            // Register before checking the flag so a concurrent `cancel()`
            // cannot slip between the check and the await.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
