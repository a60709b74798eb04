//! # statewire Model
//!
//! Leaf data model for the statewire synchronization layer.
//!
//! This crate provides:
//! - [`Reference`]: an addressable path into the remote hierarchical store
//! - [`Query`]: a reference plus optional ordering/equality filter
//! - [`Snapshot`]: a raw value delivered by the store, with the read-time
//!   normalization rule
//! - [`SubscriptionError`]: the two-kind error shape used by change
//!   subscriptions
//!
//! Everything here is a plain value type with no I/O; the traits that talk
//! to the remote service live in `statewire_core`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod path;
mod snapshot;

pub use error::SubscriptionError;
pub use path::{Query, Reference};
pub use snapshot::{JsonObject, Snapshot};
