//! Error shape for change subscriptions.

use thiserror::Error;

/// Errors raised while turning raw change notifications into typed events.
///
/// Equality is structural by kind only: two [`NoData`](Self::NoData) errors
/// are equal regardless of path, two [`MalformedData`](Self::MalformedData)
/// errors are equal regardless of path, and the two kinds are never equal
/// to each other.
#[derive(Debug, Clone, Error)]
pub enum SubscriptionError {
    /// The node holds no value, or holds the null sentinel.
    #[error("no data at {path}")]
    NoData {
        /// Path of the node the notification referred to.
        path: String,
    },

    /// The node's value does not parse as an object.
    #[error("malformed data at {path}")]
    MalformedData {
        /// Path of the node the notification referred to.
        path: String,
    },
}

impl SubscriptionError {
    /// Returns the path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::NoData { path } | Self::MalformedData { path } => path,
        }
    }
}

impl PartialEq for SubscriptionError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::NoData { .. }, Self::NoData { .. })
                | (Self::MalformedData { .. }, Self::MalformedData { .. })
        )
    }
}

impl Eq for SubscriptionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_path() {
        let a = SubscriptionError::NoData { path: "/a".into() };
        let b = SubscriptionError::NoData { path: "/b".into() };
        assert_eq!(a, b);

        let c = SubscriptionError::MalformedData { path: "/a".into() };
        let d = SubscriptionError::MalformedData { path: "/z".into() };
        assert_eq!(c, d);
    }

    #[test]
    fn kinds_are_never_equal() {
        let no_data = SubscriptionError::NoData { path: "/p".into() };
        let malformed = SubscriptionError::MalformedData { path: "/p".into() };
        assert_ne!(no_data, malformed);
    }

    #[test]
    fn display_names_the_path() {
        let err = SubscriptionError::NoData {
            path: "/notes/n1".into(),
        };
        assert_eq!(err.to_string(), "no data at /notes/n1");
    }
}
