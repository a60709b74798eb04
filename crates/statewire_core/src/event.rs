//! Events and the event fan-out bus.
//!
//! Everything that happens on the remote side of the dispatcher, from a
//! changed object to a lost connection or a completed auth command, is
//! reported as one immutable [`Event`]. Consumers receive
//! events through the bus and filter by variant; the core never calls a
//! consumer directly.

use crate::error::AuthError;
use parking_lot::RwLock;
use statewire_model::SubscriptionError;
use std::sync::mpsc::{self, Receiver, Sender};

/// Errors routed through [`Event::ObjectErrored`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ObjectError {
    /// The change notification failed shape validation.
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// The object did not decode into the declared domain type.
    #[error("decode failed at {path}: {message}")]
    Decode {
        /// Path of the node the notification referred to.
        path: String,
        /// Decoder error message.
        message: String,
    },
}

impl ObjectError {
    /// Returns the path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::Subscription(err) => err.path(),
            Self::Decode { path, .. } => path,
        }
    }
}

/// A completed identity-service action that carries no payload of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    /// The current user's password was changed.
    PasswordChanged,
    /// The current user's email was changed.
    EmailChanged,
    /// A password reset email was sent.
    PasswordReset,
    /// A verification email was sent.
    EmailVerificationSent,
}

/// An immutable notification of a remote change, error, or lifecycle
/// transition, generic over the domain object type `T`.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    /// A new object appeared under a subscribed query.
    ObjectAdded(T),
    /// An object under a subscribed query changed.
    ObjectChanged(T),
    /// An object under a subscribed query was removed.
    ObjectRemoved(T),
    /// A change notification could not be turned into a domain object.
    ObjectErrored(ObjectError),
    /// An observer was registered (`true`) or removed (`false`) at a path.
    ObjectObserved {
        /// Path of the observed node.
        path: String,
        /// Whether the node is now observed.
        observed: bool,
    },
    /// A query subscription was established (`true`) or removed (`false`).
    ObjectSubscribed(bool),
    /// The connectivity signal changed.
    ConnectionChanged(bool),
    /// A user logged in.
    UserLoggedIn {
        /// Provider-assigned user id.
        user_id: String,
        /// Whether the user's email address is verified.
        email_verified: bool,
        /// The user's email address.
        email: String,
    },
    /// A user account was created.
    UserSignedUp {
        /// Provider-assigned user id.
        user_id: String,
        /// The email the account was created with.
        email: String,
    },
    /// The current user was re-resolved from the provider.
    UserIdentified {
        /// Provider-assigned user id.
        user_id: String,
        /// Whether the user's email address is verified.
        email_verified: bool,
    },
    /// The current user logged out.
    UserLoggedOut,
    /// An identity-service command failed.
    UserAuthFailed(AuthError),
    /// An identity-service command completed without a payload.
    UserAuthenticationAction(AuthAction),
    /// Sending a verification email failed (minor, recoverable).
    EmailVerificationError(AuthError),
}

/// A dispatch target that accepts events.
///
/// This is the only capability commands and managers see of the
/// application's state store; nothing in the core depends on how events
/// are reduced.
pub trait EventSink<T>: Send + Sync {
    /// Accepts one event.
    fn accept(&self, event: Event<T>);
}

/// Fans events out to all current subscribers.
///
/// Subscribers receive every event emitted after they subscribe, in emit
/// order. Disconnected subscribers are pruned on the next emit.
pub struct EventBus<T> {
    subscribers: RwLock<Vec<Sender<Event<T>>>>,
}

impl<T: Clone> EventBus<T> {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribes to the event stream.
    pub fn subscribe(&self) -> Receiver<Event<T>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Emits one event to all current subscribers.
    pub fn emit(&self, event: Event<T>) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> EventSink<T> for EventBus<T> {
    fn accept(&self, event: Event<T>) {
        self.emit(event);
    }
}
