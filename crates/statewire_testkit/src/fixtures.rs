//! Shared fixtures.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use statewire_model::{Reference, Snapshot};

/// A small domain type for subscription and dispatch tests.
///
/// `id` is injected from the path at decode time; unknown injected fields
/// (such as the path-reference field) are ignored by serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Path-derived identifier.
    pub id: String,
    /// Note title.
    pub title: String,
    /// Completion flag.
    #[serde(default)]
    pub done: bool,
}

/// Builds the stored form of a note (no `"id"`; that comes from the path).
pub fn note_value(title: &str) -> Value {
    json!({ "title": title, "done": false })
}

/// Builds a child snapshot for a note under `base`.
pub fn note_snapshot(base: &Reference, key: &str, title: &str) -> Snapshot {
    Snapshot::new(base.child(key), note_value(title))
}
