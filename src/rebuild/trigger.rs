//! Debounced rebuild requests.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Create the trigger and the receiver the coordinator consumes.
pub fn channel() -> (RebuildTrigger, mpsc::Receiver<()>) {
    // One slot: a pending signal coalesces everything behind it.
    let (tx, rx) = mpsc::channel(1);
    (RebuildTrigger { tx }, rx)
}

/// Hand to fire a rebuild request without waiting for it.
#[derive(Clone)]
pub struct RebuildTrigger {
    tx: mpsc::Sender<()>,
}

impl RebuildTrigger {
    /// Enqueue a rebuild signal. Returns false when the signal was
    /// dropped because one is already pending (or the coordinator is
    /// gone during shutdown).
    pub fn request(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => false,
            Err(TrySendError::Closed(())) => {
                tracing::debug!("rebuild trigger dropped, coordinator stopped");
                false
            }
        }
    }
}
