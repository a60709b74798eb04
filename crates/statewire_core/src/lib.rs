//! # statewire Core
//!
//! Command/event dispatch core for the statewire synchronization layer.
//!
//! This crate provides:
//! - The [`Command`] set and the [`Dispatcher`] that executes it
//! - The [`Event`] set and the [`EventBus`] fan-out
//! - The per-query subscription state machine ([`ObjectSubscription`])
//! - The recursive partial-update merge ([`flatten_update`])
//! - The connection-liveness monitor ([`ConnectionMonitor`])
//! - The auth session command mapping ([`AuthSessionManager`])
//! - Capability traits for the remote collaborators ([`RemoteStore`],
//!   [`IdentityProvider`], [`BlobStore`])
//!
//! ## Architecture
//!
//! The dispatcher is the sole seam. Effects flow one way
//! (application → command → dispatcher → remote collaborator) and
//! notifications flow the other way (remote collaborator → subscription
//! manager / monitor / auth manager → event → dispatcher → application
//! state store). No component calls another directly.
//!
//! ## Key invariants
//!
//! - At most one low-level observer registration per query description,
//!   enforced by the subscription record's boolean guard
//! - Subscribe and unsubscribe are idempotent; lifecycle events are emitted
//!   exactly once per transition
//! - A partial update touches only the leaf fields actually present
//! - No failure crosses the dispatcher as a panic; everything becomes a
//!   callback argument or an event

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod blob;
mod command;
mod dispatcher;
mod error;
mod event;
mod merge;
mod monitor;
mod store;
mod subscription;

pub use auth::{AuthSessionManager, AuthUser, IdentityProvider};
pub use blob::BlobStore;
pub use command::{
    Command, DeleteCompletion, ObjectCompletion, ObserveCallback, SignUpCompletion,
    UploadCompletion, UploadInfo,
};
pub use dispatcher::Dispatcher;
pub use error::{AuthError, StoreError, StoreResult};
pub use event::{AuthAction, Event, EventBus, EventSink, ObjectError};
pub use merge::flatten_update;
pub use monitor::ConnectionMonitor;
pub use store::{
    ChildEvent, ListenerId, ObserverHandle, RemoteStore, SnapshotCallback, SnapshotCompletion,
};
pub use subscription::ObjectSubscription;
