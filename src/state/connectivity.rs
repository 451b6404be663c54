//! Online/offline display flag.
//!
//! Events come from whatever source the host wires in (browser listeners, a
//! network probe, a test) through an `mpsc` channel. The flag is published on
//! a `watch` channel; nothing is queued or retried when offline.

#[cfg(test)]
#[path = "connectivity_test.rs"]
mod connectivity_test;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

#[derive(Debug)]
pub struct Connectivity {
    tx: watch::Sender<bool>,
}

impl Connectivity {
    #[must_use]
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self { tx }
    }

    pub fn apply(&self, event: ConnectivityEvent) {
        let online = event == ConnectivityEvent::Online;
        let changed = self.tx.send_if_modified(|current| {
            let changed = *current != online;
            *current = online;
            changed
        });
        if changed {
            tracing::info!(online, "connectivity changed");
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Feed events from `events` into `connectivity` until the sender side closes.
pub fn spawn_connectivity_listener(
    connectivity: Arc<Connectivity>,
    mut events: mpsc::Receiver<ConnectivityEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            connectivity.apply(event);
        }
        tracing::debug!("connectivity event source closed");
    })
}
