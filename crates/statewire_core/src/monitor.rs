//! Connection-liveness monitor.

use crate::event::{Event, EventSink};
use crate::store::{ListenerId, RemoteStore};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

/// Republishes the store's connectivity signal as boolean events.
///
/// The signal is best-effort: values that do not resolve to a boolean are
/// silently dropped. Starting the monitor twice without an intervening stop
/// registers a duplicate listener at the store and orphans the first one;
/// avoiding that is the caller's contract, not enforced here.
pub struct ConnectionMonitor {
    listener: Mutex<Option<ListenerId>>,
}

impl ConnectionMonitor {
    /// Creates an inactive monitor.
    pub fn new() -> Self {
        Self {
            listener: Mutex::new(None),
        }
    }

    /// Returns true while a connectivity listener is registered.
    pub fn is_active(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Registers the connectivity listener.
    pub fn start<T: 'static>(&self, store: &Arc<dyn RemoteStore>, sink: &Arc<dyn EventSink<T>>) {
        let sink = Arc::clone(sink);
        let id = store.observe_connection(Box::new(move |value| {
            if let Some(connected) = value.as_bool() {
                sink.accept(Event::ConnectionChanged(connected));
            }
        }));
        if self.listener.lock().replace(id).is_some() {
            warn!("connection monitor started twice without a stop");
        }
    }

    /// Removes the connectivity listener, if one is registered.
    pub fn stop(&self, store: &dyn RemoteStore) {
        if let Some(id) = self.listener.lock().take() {
            store.remove_listener(id);
        }
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}
