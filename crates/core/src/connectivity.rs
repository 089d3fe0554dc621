//! Online/offline signal consumed by the presentation layer.
//!
//! The sync engine never consults this; a fetch attempted while offline
//! simply fails with a general remote failure.

use tokio::sync::watch;

/// Source of the current connectivity state.
pub trait NetworkMonitor: Send + Sync {
    fn is_online(&self) -> bool;

    /// Receiver that observes every state change.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Monitor backed by a watch channel that a probe task publishes into.
#[derive(Debug, Clone)]
pub struct WatchMonitor {
    tx: watch::Sender<bool>,
}

impl WatchMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self { tx }
    }

    /// Publish a new state. Returns true when it differs from the previous one.
    pub fn set_online(&self, online: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }
}

impl NetworkMonitor for WatchMonitor {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Monitor that always reports online.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl NetworkMonitor for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(true);
        drop(tx);
        rx
    }
}
