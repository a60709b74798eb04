//! Snapshots and the read-time normalization rule.

use crate::path::Reference;
use serde_json::Value;

/// An unordered string-keyed JSON object.
pub type JsonObject = serde_json::Map<String, Value>;

/// A raw value delivered by the remote store for one reference.
///
/// The store's explicit "no value" marker (the null sentinel) is carried as
/// `Value::Null`, distinct from the snapshot never having been delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    reference: Reference,
    value: Value,
}

impl Snapshot {
    /// Creates a snapshot of a value at a reference.
    pub fn new(reference: Reference, value: Value) -> Self {
        Self { reference, value }
    }

    /// Creates a snapshot for a node that holds no value.
    pub fn missing(reference: Reference) -> Self {
        Self {
            reference,
            value: Value::Null,
        }
    }

    /// Returns the reference this snapshot was taken at.
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Returns the raw value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns true if the node holds a value (not the null sentinel).
    pub fn exists(&self) -> bool {
        !self.value.is_null()
    }

    /// Normalizes the snapshot for delivery to a read completion.
    ///
    /// - an absent value or the null sentinel normalizes to `None`
    /// - an object normalizes to itself with `"id"` overwritten to the
    ///   terminal path segment
    /// - a bare scalar normalizes to a single-entry object mapping the
    ///   terminal segment name to that scalar
    pub fn normalized(&self) -> Option<JsonObject> {
        match &self.value {
            Value::Null => None,
            Value::Object(map) => {
                let mut map = map.clone();
                if let Some(key) = self.reference.key() {
                    map.insert("id".to_owned(), Value::String(key.to_owned()));
                }
                Some(map)
            }
            scalar => {
                let key = self.reference.key()?;
                let mut map = JsonObject::new();
                map.insert(key.to_owned(), scalar.clone());
                Some(map)
            }
        }
    }
}
