//! In-memory remote store with a write log.

use parking_lot::Mutex;
use serde_json::Value;
use statewire_core::{
    ChildEvent, ListenerId, RemoteStore, SnapshotCallback, SnapshotCompletion, StoreError,
    StoreResult,
};
use statewire_model::{JsonObject, Query, Reference, Snapshot};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// One recorded write against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteCall {
    /// A full overwrite.
    Set {
        /// Path written to.
        path: String,
        /// Value written.
        value: Value,
    },
    /// A shallow partial update, as passed by the caller.
    Update {
        /// Path of the update call.
        path: String,
        /// Key/value pairs as given (keys may contain path separators).
        values: JsonObject,
    },
    /// A subtree removal.
    Remove {
        /// Path removed.
        path: String,
    },
}

enum Listener {
    Value {
        reference: Reference,
        callback: SnapshotCallback,
    },
    Child {
        key: String,
        event: ChildEvent,
        callback: SnapshotCallback,
    },
    Connection {
        callback: Box<dyn FnMut(Value) + Send>,
    },
}

struct Inner {
    root: Value,
    listeners: HashMap<ListenerId, Listener>,
    writes: Vec<WriteCall>,
}

/// A [`RemoteStore`] backed by an in-memory JSON tree.
///
/// Every write is recorded in a log so tests can assert on the exact calls
/// the core issued. Value observers are notified inline on writes;
/// child-level change notifications and the connectivity signal are
/// injected by the test through [`fire_child_event`](Self::fire_child_event)
/// and [`set_connection_signal`](Self::set_connection_signal).
///
/// Callbacks are invoked while the store lock is held and must not call
/// back into the store.
pub struct MemoryRemoteStore {
    inner: Mutex<Inner>,
    next_listener: AtomicU64,
    fail_writes: Mutex<Option<StoreError>>,
}

impl MemoryRemoteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                root: Value::Null,
                listeners: HashMap::new(),
                writes: Vec::new(),
            }),
            next_listener: AtomicU64::new(1),
            fail_writes: Mutex::new(None),
        }
    }

    /// Makes every subsequent write fail with the given error.
    pub fn fail_writes_with(&self, error: StoreError) {
        *self.fail_writes.lock() = Some(error);
    }

    /// Clears a scripted write failure.
    pub fn clear_write_failure(&self) {
        *self.fail_writes.lock() = None;
    }

    /// Returns all writes recorded so far.
    pub fn write_log(&self) -> Vec<WriteCall> {
        self.inner.lock().writes.clone()
    }

    /// Clears the write log.
    pub fn clear_write_log(&self) {
        self.inner.lock().writes.clear();
    }

    /// Returns the number of registered listeners of any kind.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Returns the value at a reference, or `None` when the node is absent.
    pub fn value_at(&self, reference: &Reference) -> Option<Value> {
        node(&self.inner.lock().root, reference.path()).cloned()
    }

    /// Sets a value without logging or notifying anyone.
    pub fn seed(&self, reference: &Reference, value: Value) {
        let mut inner = self.inner.lock();
        *node_mut(&mut inner.root, reference.path()) = value;
    }

    /// Sets a value without logging, but notifies value observers.
    pub fn seed_and_notify(&self, reference: &Reference, value: Value) {
        let mut inner = self.inner.lock();
        *node_mut(&mut inner.root, reference.path()) = value;
        notify_value_listeners(&mut inner, reference.path());
    }

    /// Delivers a child-level change notification to matching listeners.
    pub fn fire_child_event(&self, query: &Query, event: ChildEvent, snapshot: Snapshot) {
        let key = query.description();
        let mut inner = self.inner.lock();
        for listener in inner.listeners.values_mut() {
            if let Listener::Child {
                key: listener_key,
                event: listener_event,
                callback,
            } = listener
            {
                if *listener_key == key && *listener_event == event {
                    callback(snapshot.clone());
                }
            }
        }
    }

    /// Delivers a raw value on the connectivity signal.
    pub fn set_connection_signal(&self, value: Value) {
        let mut inner = self.inner.lock();
        for listener in inner.listeners.values_mut() {
            if let Listener::Connection { callback } = listener {
                callback(value.clone());
            }
        }
    }

    fn next_id(&self) -> ListenerId {
        self.next_listener.fetch_add(1, Ordering::SeqCst)
    }

    fn write_error(&self) -> StoreResult<()> {
        match self.fail_writes.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn set_value(&self, reference: &Reference, value: JsonObject) -> StoreResult<()> {
        self.write_error()?;
        let mut inner = self.inner.lock();
        *node_mut(&mut inner.root, reference.path()) = Value::Object(value.clone());
        inner.writes.push(WriteCall::Set {
            path: reference.path().to_owned(),
            value: Value::Object(value),
        });
        notify_value_listeners(&mut inner, reference.path());
        Ok(())
    }

    fn update_children(&self, reference: &Reference, values: JsonObject) -> StoreResult<()> {
        self.write_error()?;
        let mut inner = self.inner.lock();
        for (key, value) in &values {
            let target = reference.child(key);
            *node_mut(&mut inner.root, target.path()) = value.clone();
        }
        inner.writes.push(WriteCall::Update {
            path: reference.path().to_owned(),
            values,
        });
        notify_value_listeners(&mut inner, reference.path());
        Ok(())
    }

    fn remove_value(&self, reference: &Reference) -> StoreResult<()> {
        self.write_error()?;
        let mut inner = self.inner.lock();
        match reference.parent() {
            None => inner.root = Value::Null,
            Some(parent) => {
                if let Some(map) = node_mut(&mut inner.root, parent.path()).as_object_mut() {
                    map.remove(reference.key().unwrap_or_default());
                }
            }
        }
        inner.writes.push(WriteCall::Remove {
            path: reference.path().to_owned(),
        });
        notify_value_listeners(&mut inner, reference.path());
        Ok(())
    }

    fn read_once(&self, reference: &Reference, completion: SnapshotCompletion) {
        let snapshot = {
            let inner = self.inner.lock();
            snapshot_at(&inner.root, reference)
        };
        completion(snapshot);
    }

    fn query_once(&self, query: &Query, completion: SnapshotCompletion) {
        let snapshot = {
            let inner = self.inner.lock();
            evaluate_query(&inner.root, query)
        };
        completion(snapshot);
    }

    fn observe_value(&self, reference: &Reference, callback: SnapshotCallback) -> ListenerId {
        let id = self.next_id();
        let mut inner = self.inner.lock();
        let snapshot = snapshot_at(&inner.root, reference);
        let mut callback = callback;
        // Registration delivers the current value immediately.
        callback(snapshot);
        inner.listeners.insert(
            id,
            Listener::Value {
                reference: reference.clone(),
                callback,
            },
        );
        id
    }

    fn observe_child_event(
        &self,
        query: &Query,
        event: ChildEvent,
        callback: SnapshotCallback,
    ) -> ListenerId {
        let id = self.next_id();
        self.inner.lock().listeners.insert(
            id,
            Listener::Child {
                key: query.description(),
                event,
                callback,
            },
        );
        id
    }

    fn observe_connection(&self, callback: Box<dyn FnMut(Value) + Send>) -> ListenerId {
        let id = self.next_id();
        self.inner
            .lock()
            .listeners
            .insert(id, Listener::Connection { callback });
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.inner.lock().listeners.remove(&id);
    }

    fn remove_observers(&self, reference: &Reference) {
        self.inner.lock().listeners.retain(|_, listener| {
            !matches!(listener, Listener::Value { reference: observed, .. } if observed == reference)
        });
    }
}

fn node<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    let mut current = root;
    for segment in path.split('/') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn node_mut<'a>(root: &'a mut Value, path: &str) -> &'a mut Value {
    let mut current = root;
    if path.is_empty() {
        return current;
    }
    for segment in path.split('/') {
        if !current.is_object() {
            *current = Value::Object(JsonObject::new());
        }
        current = current
            .as_object_mut()
            .expect("just made an object")
            .entry(segment)
            .or_insert(Value::Null);
    }
    current
}

fn snapshot_at(root: &Value, reference: &Reference) -> Snapshot {
    match node(root, reference.path()) {
        Some(value) => Snapshot::new(reference.clone(), value.clone()),
        None => Snapshot::missing(reference.clone()),
    }
}

fn evaluate_query(root: &Value, query: &Query) -> Snapshot {
    let reference = query.reference();
    let Some(Value::Object(children)) = node(root, reference.path()) else {
        return Snapshot::missing(reference.clone());
    };
    let matches: JsonObject = children
        .iter()
        .filter(|(_, child)| match (query.order_key(), query.filter_value()) {
            (Some(key), Some(expected)) => child.get(key) == Some(expected),
            _ => true,
        })
        .map(|(key, child)| (key.clone(), child.clone()))
        .collect();
    if matches.is_empty() {
        Snapshot::missing(reference.clone())
    } else {
        Snapshot::new(reference.clone(), Value::Object(matches))
    }
}

/// True when a change at `changed` affects an observer at `observed`.
fn paths_overlap(observed: &str, changed: &str) -> bool {
    if observed.is_empty() || changed.is_empty() {
        return true;
    }
    observed == changed
        || observed.starts_with(&format!("{changed}/"))
        || changed.starts_with(&format!("{observed}/"))
}

fn notify_value_listeners(inner: &mut Inner, changed: &str) {
    let root = inner.root.clone();
    for listener in inner.listeners.values_mut() {
        if let Listener::Value {
            reference,
            callback,
        } = listener
        {
            if paths_overlap(reference.path(), changed) {
                callback(snapshot_at(&root, reference));
            }
        }
    }
}
