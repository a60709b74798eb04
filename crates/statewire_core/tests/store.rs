//! Observer-handle lifecycle tests against the in-memory store.

use serde_json::json;
use statewire_core::{ObserverHandle, RemoteStore};
use statewire_model::{Reference, Snapshot};
use statewire_testkit::MemoryRemoteStore;
use std::sync::mpsc;
use std::sync::Arc;

fn observed_handle(
    memory: &Arc<MemoryRemoteStore>,
) -> (ObserverHandle, mpsc::Receiver<Snapshot>) {
    let store: Arc<dyn RemoteStore> = Arc::clone(memory) as Arc<dyn RemoteStore>;
    let reference = Reference::new("notes/n1");
    let (tx, rx) = mpsc::channel();
    let id = store.observe_value(
        &reference,
        Box::new(move |snapshot| {
            let _ = tx.send(snapshot);
        }),
    );
    (ObserverHandle::new(store, id, reference), rx)
}

#[test]
fn dropping_the_handle_removes_the_listener() {
    let memory = Arc::new(MemoryRemoteStore::new());
    let (handle, rx) = observed_handle(&memory);
    // Registration delivers the current value.
    let _ = rx.recv().unwrap();
    assert_eq!(memory.listener_count(), 1);
    assert_eq!(handle.reference(), &Reference::new("notes/n1"));

    drop(handle);
    assert_eq!(memory.listener_count(), 0);

    // Later writes no longer reach the dropped callback.
    memory.seed_and_notify(&Reference::new("notes/n1"), json!({"title": "x"}));
    assert!(rx.try_recv().is_err());
}

#[test]
fn cancel_removes_the_listener_eagerly() {
    let memory = Arc::new(MemoryRemoteStore::new());
    let (handle, rx) = observed_handle(&memory);
    let _ = rx.recv().unwrap();
    assert_eq!(memory.listener_count(), 1);

    handle.cancel();
    assert_eq!(memory.listener_count(), 0);

    memory.seed_and_notify(&Reference::new("notes/n1"), json!({"title": "x"}));
    assert!(rx.try_recv().is_err());
}
