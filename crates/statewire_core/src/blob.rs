//! Blob store capability.

use crate::command::{DeleteCompletion, UploadCompletion};
use statewire_model::Reference;
use std::path::Path;

/// The capability set the core needs from the binary blob service.
///
/// These are pure pass-through side effects: all notification happens via
/// the supplied completion, never via events. Retry and backoff policy is
/// the implementation's concern.
pub trait BlobStore: Send + Sync {
    /// Uploads raw bytes to a destination reference.
    fn put_bytes(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        destination: &Reference,
        completion: UploadCompletion,
    );

    /// Uploads a local file to a destination reference.
    fn put_file(&self, location: &Path, destination: &Reference, completion: UploadCompletion);

    /// Deletes the blob at a reference.
    fn delete(&self, reference: &Reference, completion: DeleteCompletion);
}
