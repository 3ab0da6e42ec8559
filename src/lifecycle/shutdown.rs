//! Shutdown coordination.
//!
//! Long-lived background tasks (the registry sweeper) hold a
//! [`ShutdownHandle`] and stop when the owning server triggers it,
//! rather than running for the remainder of the process.

use tokio::sync::broadcast;

/// Broadcast-based shutdown signal, owned by the server lifecycle.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Hand out a handle for one background task.
    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            rx: self.tx.subscribe(),
        }
    }

    /// Signal every handle to stop.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side held by a background task.
pub struct ShutdownHandle {
    rx: broadcast::Receiver<()>,
}

impl ShutdownHandle {
    /// Resolves once shutdown is triggered. A closed or lagged channel
    /// also means "stop".
    pub async fn recv(&mut self) {
        let _ = self.rx.recv().await;
    }
}
