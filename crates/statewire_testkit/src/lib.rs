//! # statewire Testkit
//!
//! Test utilities for statewire.
//!
//! This crate provides:
//! - An in-memory remote store with a write log and injectable
//!   notifications
//! - A scriptable identity provider
//! - An in-memory blob store
//! - An event-collecting sink
//! - Shared fixtures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use statewire_testkit::prelude::*;
//!
//! let store = MemoryRemoteStore::new();
//! // drive the core against it, then assert on store.write_log()
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod blob;
pub mod fixtures;
pub mod identity;
pub mod sink;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::blob::*;
    pub use crate::fixtures::*;
    pub use crate::identity::*;
    pub use crate::sink::*;
    pub use crate::store::*;
}

pub use blob::{MemoryBlobStore, StoredBlob};
pub use fixtures::{note_snapshot, note_value, Note};
pub use identity::MockIdentityProvider;
pub use sink::CollectingSink;
pub use store::{MemoryRemoteStore, WriteCall};
