//! Shutdown coordination and drain deadlines.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

/// Signals every long-running task to stop, then bounds how long the edge
/// waits for in-flight work afterwards.
///
/// Clones share the same signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    drain: Duration,
}

impl Shutdown {
    /// `drain` bounds connection draining and the deferred-task flush.
    pub fn new(drain: Duration) -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx, drain }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    pub fn drain_deadline(&self) -> Duration {
        self.drain
    }

    /// Resolve once the signal fires. Also resolves if every sender is gone.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    /// Wait for `work` within the drain deadline.
    ///
    /// Returns `None`, with a warning, if the deadline passed first.
    pub async fn drain<F: Future>(&self, what: &'static str, work: F) -> Option<F::Output> {
        match timeout(self.drain, work).await {
            Ok(output) => Some(output),
            Err(_) => {
                tracing::warn!(what, deadline = ?self.drain, "Drain deadline exceeded");
                None
            }
        }
    }
}
