//! Process-wide shutdown flag.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Cloneable shutdown flag.
///
/// Raised by the loop when the listener dies and by the binary on SIGINT or
/// SIGTERM. Once raised it stays raised. Sleeps taken through
/// [`ShutdownSignal::sleep`] end early when it is raised; running sync
/// tasks are never interrupted by it.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// A lowered flag.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Raise the flag. Returns true if this call raised it.
    pub fn trigger(&self) -> bool {
        !self.tx.send_replace(true)
    }

    /// Whether the flag is raised.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the flag is raised.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        rx.wait_for(|raised| *raised).await.ok();
    }

    /// Sleep for `duration` unless the flag is raised first.
    ///
    /// Returns true when the full duration elapsed.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_triggered() {
            return false;
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => true,
            () = self.triggered() => false,
        }
    }
}
