//! A cloneable handle for poking the client from external code.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;

/// A cloneable handle for poking the client from external code.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct ChatHandle {
    cancel: Arc<Mutex<CancellationToken>>,
    idle_notify: Arc<tokio::sync::Notify>,
    is_loading: Arc<AtomicBool>,
}

impl ChatHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            idle_notify: Arc::new(tokio::sync::Notify::new()),
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the single send slot. Returns a fresh cancellation token for the
    /// send, or `None` if another send holds the slot.
    pub(crate) fn try_begin(&self) -> Option<CancellationToken> {
        if self
            .is_loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        Some(token)
    }

    /// Release the send slot and wake idle waiters.
    pub(crate) fn finish(&self) {
        self.is_loading.store(false, Ordering::Release);
        self.idle_notify.notify_waiters();
    }

    /// Abort the current send.
    pub fn abort(&self) {
        self.cancel.lock().cancel();
    }

    /// Guard that aborts the current send when dropped.
    ///
    /// Hold one for as long as the view rendering the conversation is alive;
    /// clones of the client used by spawned sends don't keep it running.
    pub fn abort_on_drop(&self) -> AbortOnDrop {
        AbortOnDrop {
            handle: self.clone(),
        }
    }

    /// Whether a send is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::Acquire)
    }

    /// Wait until no send is in flight.
    pub async fn wait_for_idle(&self) {
        let notified = self.idle_notify.notified();
        if !self.is_loading() {
            return;
        }
        notified.await;
    }

    /// Wait until idle, with a timeout.
    /// Returns `true` if idle was reached, `false` on timeout.
    pub async fn wait_for_idle_timeout(&self, timeout: std::time::Duration) -> bool {
        if !self.is_loading() {
            return true;
        }
        tokio::time::timeout(timeout, self.wait_for_idle())
            .await
            .is_ok()
    }
}

/// Aborts the in-flight send on drop. See [`ChatHandle::abort_on_drop`].
#[must_use = "dropping the guard aborts the send immediately"]
pub struct AbortOnDrop {
    handle: ChatHandle,
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_single_slot() {
        let handle = ChatHandle::new();
        let token = handle.try_begin();
        assert!(token.is_some());
        assert!(handle.is_loading());
        assert!(handle.try_begin().is_none());

        handle.finish();
        assert!(!handle.is_loading());
        assert!(handle.try_begin().is_some());
    }

    #[test]
    fn test_abort_cancels_current_token() {
        let handle = ChatHandle::new();
        let token = handle.try_begin().unwrap();
        handle.clone().abort();
        assert!(token.is_cancelled());

        handle.finish();
        let next = handle.try_begin().unwrap();
        assert!(!next.is_cancelled());
    }

    #[test]
    fn test_abort_on_drop() {
        let handle = ChatHandle::new();
        let token = handle.try_begin().unwrap();
        let guard = handle.abort_on_drop();
        assert!(!token.is_cancelled());

        drop(guard);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_wait_for_idle() {
        let handle = ChatHandle::new();
        assert!(handle.wait_for_idle_timeout(Duration::from_millis(10)).await);

        handle.try_begin().unwrap();
        assert!(!handle.wait_for_idle_timeout(Duration::from_millis(20)).await);

        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.wait_for_idle().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.finish();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter woke")
            .unwrap();
    }
}
