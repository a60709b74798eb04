//! Remote store capability and observer handles.

use crate::error::StoreResult;
use serde_json::Value;
use statewire_model::{JsonObject, Query, Reference, Snapshot};
use std::fmt;
use std::sync::Arc;

/// Identifier for a registered listener, scoped to one store instance.
pub type ListenerId = u64;

/// A persistent listener callback; fires once per delivered snapshot.
pub type SnapshotCallback = Box<dyn FnMut(Snapshot) + Send>;

/// A one-shot read completion.
pub type SnapshotCompletion = Box<dyn FnOnce(Snapshot) + Send>;

/// The kind of child-level change notification a listener is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildEvent {
    /// A child appeared under the query.
    Added,
    /// An existing child's value changed.
    Changed,
    /// A child was removed.
    Removed,
}

/// The capability set the core needs from the remote hierarchical store.
///
/// Implementations own the transport; callbacks may fire on any thread the
/// transport chooses and must be treated as concurrent with the caller.
/// The provided [`search`](RemoteStore::search) method derives the
/// order-by/equal-to query; hosts override it only when the backing service
/// has a native search surface.
pub trait RemoteStore: Send + Sync {
    /// Overwrites the full value at a reference.
    fn set_value(&self, reference: &Reference, value: JsonObject) -> StoreResult<()>;

    /// Issues a shallow partial update at a reference.
    ///
    /// Keys may contain path separators for pre-flattened multi-level
    /// writes; each key is applied relative to `reference`.
    fn update_children(&self, reference: &Reference, values: JsonObject) -> StoreResult<()>;

    /// Deletes the full subtree at a reference.
    fn remove_value(&self, reference: &Reference) -> StoreResult<()>;

    /// Reads the value at a reference once.
    fn read_once(&self, reference: &Reference, completion: SnapshotCompletion);

    /// Reads the result of a filtered query once.
    fn query_once(&self, query: &Query, completion: SnapshotCompletion);

    /// Registers a persistent value listener at a reference.
    fn observe_value(&self, reference: &Reference, callback: SnapshotCallback) -> ListenerId;

    /// Registers a child-level change listener against a query.
    fn observe_child_event(
        &self,
        query: &Query,
        event: ChildEvent,
        callback: SnapshotCallback,
    ) -> ListenerId;

    /// Registers a listener on the store's well-known connectivity signal.
    ///
    /// The signal is best-effort; values are delivered raw and the caller
    /// decides what to do with non-boolean ones.
    fn observe_connection(&self, callback: Box<dyn FnMut(Value) + Send>) -> ListenerId;

    /// Removes one listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Removes all value listeners registered at a reference.
    fn remove_observers(&self, reference: &Reference);

    /// One-shot search: derives an ordered-by-`key`, equal-to-`value` query
    /// from the base query and reads it once.
    fn search(&self, base: &Query, key: &str, value: Value, completion: SnapshotCompletion) {
        let query = base.clone().order_by(key).equal_to(value);
        self.query_once(&query, completion);
    }
}

/// Owning handle for one persistent listener registration.
///
/// Dropping the handle removes the listener, so a host cannot accumulate
/// registrations by forgetting to cancel.
pub struct ObserverHandle {
    store: Arc<dyn RemoteStore>,
    id: Option<ListenerId>,
    reference: Reference,
}

impl ObserverHandle {
    /// Wraps a registered listener id.
    pub fn new(store: Arc<dyn RemoteStore>, id: ListenerId, reference: Reference) -> Self {
        Self {
            store,
            id: Some(id),
            reference,
        }
    }

    /// Returns the reference the listener was registered at.
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Removes the listener now instead of at drop time.
    pub fn cancel(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(id) = self.id.take() {
            self.store.remove_listener(id);
        }
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.remove();
    }
}

impl fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverHandle")
            .field("id", &self.id)
            .field("reference", &self.reference)
            .finish()
    }
}
