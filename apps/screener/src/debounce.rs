//! Trailing-edge debouncer for search input.
//!
//! Each call schedules the action after the delay and cancels whatever was
//! previously scheduled, so only the last call in a burst runs.

use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedules `action` after the delay, cancelling any prior pending call.
    /// Must be called from within a tokio runtime.
    pub fn call<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => action(),
            }
        });
    }

    /// Drops any pending call without running it.
    pub fn cancel(&self) {
        if let Some(token) = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            token.cancel();
        }
    }
}
