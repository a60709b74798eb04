//! Per-query subscription state machine.
//!
//! A subscription record owns one boolean guard per logical collection:
//! the first `subscribe` registers the three child-level listeners and
//! flips the guard, a second `subscribe` is a no-op, and `unsubscribe`
//! mirrors that on the way down. The guard is the sole enforcement of the
//! at-most-one-registration invariant; the transport is never consulted.

use crate::event::{Event, EventSink, ObjectError};
use crate::store::{ChildEvent, ListenerId, RemoteStore};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use statewire_model::{Query, Snapshot, SubscriptionError};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct RecordState {
    subscribed: bool,
    listeners: Vec<ListenerId>,
}

/// Subscription record for one query, decoding change notifications into
/// the domain type `T`.
///
/// Owned by whichever state slice declares it, one record per logical
/// collection. Mutation happens only through [`subscribe`](Self::subscribe)
/// and [`unsubscribe`](Self::unsubscribe); both are idempotent.
pub struct ObjectSubscription<T> {
    query: Query,
    state: Mutex<RecordState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ObjectSubscription<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Creates an unsubscribed record for a query.
    pub fn new(query: Query) -> Self {
        Self {
            query,
            state: Mutex::new(RecordState::default()),
            _marker: PhantomData,
        }
    }

    /// Returns the query this record tracks.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Returns true while the low-level listeners are registered.
    pub fn is_subscribed(&self) -> bool {
        self.state.lock().subscribed
    }

    /// Registers the child-added/changed/removed listeners and emits
    /// `ObjectSubscribed(true)`. No-op while already subscribed.
    pub fn subscribe(&self, store: &Arc<dyn RemoteStore>, sink: &Arc<dyn EventSink<T>>) {
        let mut state = self.state.lock();
        if state.subscribed {
            debug!(query = %self.query.description(), "already subscribed");
            return;
        }
        for kind in [ChildEvent::Added, ChildEvent::Changed, ChildEvent::Removed] {
            let sink = Arc::clone(sink);
            let id = store.observe_child_event(
                &self.query,
                kind,
                Box::new(move |snapshot| deliver::<T>(kind, snapshot, sink.as_ref())),
            );
            state.listeners.push(id);
        }
        state.subscribed = true;
        debug!(query = %self.query.description(), "subscribed");
        sink.accept(Event::ObjectSubscribed(true));
    }

    /// Removes all listeners and emits `ObjectSubscribed(false)`. No-op
    /// (and emits nothing) while already unsubscribed.
    pub fn unsubscribe(&self, store: &dyn RemoteStore, sink: &dyn EventSink<T>) {
        let mut state = self.state.lock();
        if !state.subscribed {
            return;
        }
        for id in state.listeners.drain(..) {
            store.remove_listener(id);
        }
        state.subscribed = false;
        debug!(query = %self.query.description(), "unsubscribed");
        sink.accept(Event::ObjectSubscribed(false));
    }
}

/// Validates one child-level notification and emits the typed event.
fn deliver<T: DeserializeOwned>(kind: ChildEvent, snapshot: Snapshot, sink: &dyn EventSink<T>) {
    let path = snapshot.reference().to_string();
    if !snapshot.exists() {
        sink.accept(Event::ObjectErrored(
            SubscriptionError::NoData { path }.into(),
        ));
        return;
    }
    let Value::Object(map) = snapshot.value() else {
        sink.accept(Event::ObjectErrored(
            SubscriptionError::MalformedData { path }.into(),
        ));
        return;
    };

    let mut map = map.clone();
    if let Some(key) = snapshot.reference().key() {
        map.insert("id".to_owned(), Value::String(key.to_owned()));
    }
    map.insert("ref".to_owned(), Value::String(path.clone()));

    match serde_json::from_value::<T>(Value::Object(map)) {
        Ok(object) => sink.accept(match kind {
            ChildEvent::Added => Event::ObjectAdded(object),
            ChildEvent::Changed => Event::ObjectChanged(object),
            ChildEvent::Removed => Event::ObjectRemoved(object),
        }),
        Err(error) => sink.accept(Event::ObjectErrored(ObjectError::Decode {
            path,
            message: error.to_string(),
        })),
    }
}
