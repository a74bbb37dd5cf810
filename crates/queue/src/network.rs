//! Network-availability gate.
//!
//! The host platform owns connectivity detection and reports transitions
//! through a [`NetworkHandle`]. The dispatch worker holds the receiving end
//! and parks between batches while the device is offline, resuming as soon
//! as availability is signalled. No lock is held across the wait.

use tokio::sync::watch;

/// Sending side, owned by the host bridge.
pub struct NetworkHandle {
    tx: watch::Sender<bool>,
}

impl NetworkHandle {
    pub fn set_available(&self, available: bool) {
        // send fails only once every watcher is dropped at shutdown
        let _ = self.tx.send(available);
        tracing::info!(available, "Network availability changed");
    }

    pub fn is_available(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Receiving side, held by the dispatch worker.
#[derive(Clone)]
pub struct NetworkWatch {
    rx: watch::Receiver<bool>,
}

impl NetworkWatch {
    /// Wait indefinitely until the device reports connectivity. Returns
    /// immediately when already available.
    pub async fn wait_until_available(&mut self) {
        // Closed channel means the handle is gone at shutdown; proceeding
        // lets the worker loop wind down instead of hanging.
        let _ = self.rx.wait_for(|available| *available).await;
    }
}

pub fn channel(initially_available: bool) -> (NetworkHandle, NetworkWatch) {
    let (tx, rx) = watch::channel(initially_available);
    (NetworkHandle { tx }, NetworkWatch { rx })
}
