//! Shutdown coordination for the watchdog.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Subscribe, wrapped for use in `select!`.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal::from(self.subscribe())
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of [`Shutdown`].
///
/// A dropped coordinator means nobody can ask for shutdown any more, so
/// [`recv`](Self::recv) then waits forever instead of firing.
pub struct ShutdownSignal {
    rx: Option<broadcast::Receiver<()>>,
}

impl ShutdownSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Resolves once shutdown has been triggered.
    pub async fn recv(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            match rx.recv().await {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => return,
                Err(broadcast::error::RecvError::Closed) => self.rx = None,
            }
        }
        std::future::pending::<()>().await
    }
}

impl From<broadcast::Receiver<()>> for ShutdownSignal {
    fn from(rx: broadcast::Receiver<()>) -> Self {
        Self { rx: Some(rx) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_fires_signal() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.signal();
        assert_eq!(shutdown.receiver_count(), 1);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), signal.recv())
            .await
            .expect("signal should fire");
    }

    #[tokio::test]
    async fn test_dropped_coordinator_never_fires() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.signal();
        drop(shutdown);

        let fired = tokio::time::timeout(Duration::from_millis(50), signal.recv()).await;
        assert!(fired.is_err());
    }
}
