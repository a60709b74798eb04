//! Event-collecting sink.

use parking_lot::Mutex;
use statewire_core::{Event, EventSink};

/// An [`EventSink`] that records every accepted event in order.
pub struct CollectingSink<T> {
    events: Mutex<Vec<Event<T>>>,
}

impl<T> CollectingSink<T> {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Returns the collected events and clears the sink.
    pub fn take(&self) -> Vec<Event<T>> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Returns the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true while no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl<T: Clone> CollectingSink<T> {
    /// Returns a copy of the collected events without clearing them.
    pub fn events(&self) -> Vec<Event<T>> {
        self.events.lock().clone()
    }
}

impl<T> Default for CollectingSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> EventSink<T> for CollectingSink<T> {
    fn accept(&self, event: Event<T>) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_and_takes() {
        let sink: CollectingSink<u8> = CollectingSink::new();
        sink.accept(Event::ObjectSubscribed(true));
        sink.accept(Event::ObjectAdded(7));

        assert_eq!(sink.len(), 2);
        assert_eq!(
            sink.take(),
            vec![Event::ObjectSubscribed(true), Event::ObjectAdded(7)]
        );
        assert!(sink.is_empty());
    }
}
