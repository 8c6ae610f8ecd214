//! Shutdown coordination.

use std::time::Duration;

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks subscribe to.
/// Subscribe before spawning the signal watcher, or a fast signal can be
/// missed.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Completes `deadline` after shutdown is triggered: the bound on how
/// long a graceful drain may run before the process exits anyway.
pub async fn drain_deadline(mut shutdown_rx: broadcast::Receiver<()>, deadline: Duration) {
    let _ = shutdown_rx.recv().await;
    tokio::time::sleep(deadline).await;
}
