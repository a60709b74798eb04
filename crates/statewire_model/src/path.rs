//! References and queries into the remote hierarchical store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// An addressable path into the remote hierarchical store.
///
/// A reference is a slash-separated path with no leading or trailing
/// separator; the empty path is the root. References compare equal by
/// resolved path string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    path: String,
}

impl Reference {
    /// Creates a reference to the root of the store.
    pub fn root() -> Self {
        Self { path: String::new() }
    }

    /// Creates a reference from a path string.
    ///
    /// Leading and trailing separators are stripped so that equal paths
    /// always compare equal.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: path.trim_matches('/').to_owned(),
        }
    }

    /// Returns the resolved path string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Derives a child reference.
    ///
    /// A name that resolves to no segment at all yields the same reference,
    /// so derived paths never carry empty segments or trailing separators.
    pub fn child(&self, name: &str) -> Self {
        let name = name.trim_matches('/');
        if name.is_empty() {
            self.clone()
        } else if self.path.is_empty() {
            Self { path: name.to_owned() }
        } else {
            Self {
                path: format!("{}/{}", self.path, name),
            }
        }
    }

    /// Derives a child reference with a freshly generated unique id.
    pub fn push_child(&self) -> Self {
        self.child(&uuid::Uuid::new_v4().simple().to_string())
    }

    /// Returns the terminal path segment, or `None` for the root.
    pub fn key(&self) -> Option<&str> {
        if self.path.is_empty() {
            None
        } else {
            Some(self.path.rsplit('/').next().unwrap_or(&self.path))
        }
    }

    /// Returns the parent reference, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.path.is_empty() {
            return None;
        }
        match self.path.rsplit_once('/') {
            Some((parent, _)) => Some(Self {
                path: parent.to_owned(),
            }),
            None => Some(Self::root()),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path)
    }
}

/// A [`Reference`] plus optional ordering/equality filter.
///
/// The [`description`](Query::description) string identifies the query and
/// is used as the subscription key: two queries with the same description
/// address the same logical collection view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    reference: Reference,
    order_by: Option<String>,
    equal_to: Option<Value>,
}

impl Query {
    /// Creates an unfiltered query over a reference.
    pub fn new(reference: Reference) -> Self {
        Self {
            reference,
            order_by: None,
            equal_to: None,
        }
    }

    /// Orders the query by a child key.
    pub fn order_by(mut self, key: impl Into<String>) -> Self {
        self.order_by = Some(key.into());
        self
    }

    /// Filters the query to children whose ordered key equals a scalar.
    pub fn equal_to(mut self, value: Value) -> Self {
        self.equal_to = Some(value);
        self
    }

    /// Returns the underlying reference.
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Returns the ordering key, if any.
    pub fn order_key(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    /// Returns the equality filter value, if any.
    pub fn filter_value(&self) -> Option<&Value> {
        self.equal_to.as_ref()
    }

    /// Returns the description string identifying this query.
    pub fn description(&self) -> String {
        let mut description = format!("path={}", self.reference);
        if let Some(key) = &self.order_by {
            description.push_str(&format!(" order_by={key}"));
        }
        if let Some(value) = &self.equal_to {
            description.push_str(&format!(" equal_to={value}"));
        }
        description
    }
}
