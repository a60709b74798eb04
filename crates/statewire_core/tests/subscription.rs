//! Subscription state-machine tests against the in-memory store.

use serde_json::json;
use statewire_core::{ChildEvent, Event, EventSink, ObjectError, ObjectSubscription, RemoteStore};
use statewire_model::{Query, Reference, Snapshot, SubscriptionError};
use statewire_testkit::{CollectingSink, MemoryRemoteStore, Note};
use std::sync::Arc;

fn setup() -> (
    Arc<dyn RemoteStore>,
    Arc<MemoryRemoteStore>,
    Arc<CollectingSink<Note>>,
    Arc<dyn EventSink<Note>>,
) {
    let memory = Arc::new(MemoryRemoteStore::new());
    let store: Arc<dyn RemoteStore> = Arc::clone(&memory) as Arc<dyn RemoteStore>;
    let collecting = Arc::new(CollectingSink::new());
    let sink: Arc<dyn EventSink<Note>> = Arc::clone(&collecting) as Arc<dyn EventSink<Note>>;
    (store, memory, collecting, sink)
}

fn notes_query() -> Query {
    Query::new(Reference::new("notes"))
}

#[test]
fn subscribe_registers_three_listeners_once() {
    let (store, memory, collecting, sink) = setup();
    let subscription: ObjectSubscription<Note> = ObjectSubscription::new(notes_query());

    subscription.subscribe(&store, &sink);
    assert!(subscription.is_subscribed());
    assert_eq!(memory.listener_count(), 3);
    assert_eq!(collecting.take(), vec![Event::ObjectSubscribed(true)]);

    // Second subscribe is a no-op: no new listeners, no event.
    subscription.subscribe(&store, &sink);
    assert_eq!(memory.listener_count(), 3);
    assert!(collecting.take().is_empty());
}

#[test]
fn unsubscribe_is_idempotent() {
    let (store, memory, collecting, sink) = setup();
    let subscription: ObjectSubscription<Note> = ObjectSubscription::new(notes_query());

    // Unsubscribing while unsubscribed emits nothing.
    subscription.unsubscribe(store.as_ref(), sink.as_ref());
    assert!(collecting.take().is_empty());

    subscription.subscribe(&store, &sink);
    collecting.take();

    subscription.unsubscribe(store.as_ref(), sink.as_ref());
    assert!(!subscription.is_subscribed());
    assert_eq!(memory.listener_count(), 0);
    assert_eq!(collecting.take(), vec![Event::ObjectSubscribed(false)]);

    subscription.unsubscribe(store.as_ref(), sink.as_ref());
    assert!(collecting.take().is_empty());
}

#[test]
fn added_changed_removed_are_decoded_and_tagged() {
    let (store, memory, collecting, sink) = setup();
    let subscription: ObjectSubscription<Note> = ObjectSubscription::new(notes_query());
    subscription.subscribe(&store, &sink);
    collecting.take();

    let snapshot = Snapshot::new(
        Reference::new("notes/n1"),
        json!({"title": "hello", "done": false}),
    );
    memory.fire_child_event(&notes_query(), ChildEvent::Added, snapshot.clone());
    memory.fire_child_event(&notes_query(), ChildEvent::Changed, snapshot.clone());
    memory.fire_child_event(&notes_query(), ChildEvent::Removed, snapshot);

    let expected = Note {
        id: "n1".into(),
        title: "hello".into(),
        done: false,
    };
    assert_eq!(
        collecting.take(),
        vec![
            Event::ObjectAdded(expected.clone()),
            Event::ObjectChanged(expected.clone()),
            Event::ObjectRemoved(expected),
        ]
    );
}

#[test]
fn id_is_injected_from_the_path() {
    let (store, memory, collecting, sink) = setup();
    let subscription: ObjectSubscription<Note> = ObjectSubscription::new(notes_query());
    subscription.subscribe(&store, &sink);
    collecting.take();

    // Stored id disagrees with the path; the path wins.
    let snapshot = Snapshot::new(
        Reference::new("notes/n9"),
        json!({"id": "stale", "title": "t"}),
    );
    memory.fire_child_event(&notes_query(), ChildEvent::Added, snapshot);

    match collecting.take().remove(0) {
        Event::ObjectAdded(note) => assert_eq!(note.id, "n9"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn missing_value_reports_no_data() {
    let (store, memory, collecting, sink) = setup();
    let subscription: ObjectSubscription<Note> = ObjectSubscription::new(notes_query());
    subscription.subscribe(&store, &sink);
    collecting.take();

    memory.fire_child_event(
        &notes_query(),
        ChildEvent::Added,
        Snapshot::missing(Reference::new("notes/n1")),
    );

    assert_eq!(
        collecting.take(),
        vec![Event::ObjectErrored(
            SubscriptionError::NoData {
                path: "/notes/n1".into()
            }
            .into()
        )]
    );
}

#[test]
fn scalar_value_reports_malformed_data() {
    let (store, memory, collecting, sink) = setup();
    let subscription: ObjectSubscription<Note> = ObjectSubscription::new(notes_query());
    subscription.subscribe(&store, &sink);
    collecting.take();

    memory.fire_child_event(
        &notes_query(),
        ChildEvent::Added,
        Snapshot::new(Reference::new("notes/n1"), json!(42)),
    );

    assert_eq!(
        collecting.take(),
        vec![Event::ObjectErrored(
            SubscriptionError::MalformedData {
                path: "/notes/n1".into()
            }
            .into()
        )]
    );
}

#[test]
fn decode_failure_reports_the_decoder_error() {
    let (store, memory, collecting, sink) = setup();
    let subscription: ObjectSubscription<Note> = ObjectSubscription::new(notes_query());
    subscription.subscribe(&store, &sink);
    collecting.take();

    // "title" has the wrong type for Note.
    memory.fire_child_event(
        &notes_query(),
        ChildEvent::Added,
        Snapshot::new(Reference::new("notes/n1"), json!({"title": 7})),
    );

    match collecting.take().remove(0) {
        Event::ObjectErrored(ObjectError::Decode { path, .. }) => {
            assert_eq!(path, "/notes/n1");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
