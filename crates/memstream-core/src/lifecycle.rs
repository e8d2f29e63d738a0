//! Shutdown signalling shared by every timer task.
//!
//! Disposing sets a flag and wakes every pending [`Lifecycle::sleep`]. Timers
//! check [`Lifecycle::is_disposed`] before each deferred side effect, so
//! nothing is posted or copied after disposal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;

#[derive(Debug)]
pub struct Lifecycle {
    disposed: AtomicBool,
    tx: watch::Sender<bool>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            disposed: AtomicBool::new(false),
            tx,
        }
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.tx.send_replace(true);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`. Returns `false` if disposed before or during the wait.
    pub async fn sleep(&self, duration: Duration) -> bool {
        let mut rx = self.tx.subscribe();
        if self.is_disposed() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => !self.is_disposed(),
            _ = rx.wait_for(|disposed| *disposed) => false,
        }
    }

    /// Resolves once [`dispose`](Self::dispose) has been called.
    pub async fn disposed(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|disposed| *disposed).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn sleep_completes_when_alive() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.sleep(Duration::from_secs(5)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_wakes_pending_sleep() {
        let lifecycle = Arc::new(Lifecycle::new());
        let sleeper = {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move { lifecycle.sleep(Duration::from_secs(3600)).await })
        };
        tokio::task::yield_now().await;
        lifecycle.dispose();
        assert!(!sleeper.await.unwrap());
        assert!(lifecycle.is_disposed());
    }

    #[tokio::test]
    async fn sleep_after_dispose_returns_immediately() {
        let lifecycle = Lifecycle::new();
        lifecycle.dispose();
        assert!(!lifecycle.sleep(Duration::from_secs(3600)).await);
        lifecycle.disposed().await;
    }
}
