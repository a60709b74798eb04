//! In-memory blob store.

use parking_lot::Mutex;
use statewire_core::{BlobStore, DeleteCompletion, StoreError, UploadCompletion, UploadInfo};
use statewire_model::Reference;
use std::collections::HashMap;
use std::path::Path;

/// A stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Blob content.
    pub bytes: Vec<u8>,
    /// MIME content type.
    pub content_type: String,
}

/// A [`BlobStore`] keeping blobs in a map, with scriptable failures.
///
/// Download locations are deterministic: `memory://<path>`.
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, StoredBlob>>,
    fail_with: Mutex<Option<StoreError>>,
}

impl MemoryBlobStore {
    /// Creates an empty blob store.
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            fail_with: Mutex::new(None),
        }
    }

    /// Makes every subsequent transfer fail with the given error.
    pub fn fail_with(&self, error: StoreError) {
        *self.fail_with.lock() = Some(error);
    }

    /// Returns the blob stored at a path, if any.
    pub fn blob_at(&self, reference: &Reference) -> Option<StoredBlob> {
        self.blobs.lock().get(reference.path()).cloned()
    }

    /// Returns the number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    /// Returns true when no blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }

    fn scripted_failure(&self) -> Option<StoreError> {
        self.fail_with.lock().clone()
    }

    fn upload_info(destination: &Reference) -> UploadInfo {
        UploadInfo {
            name: destination.key().unwrap_or_default().to_owned(),
            download_location: format!("memory://{}", destination.path()),
        }
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put_bytes(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        destination: &Reference,
        completion: UploadCompletion,
    ) {
        if let Some(error) = self.scripted_failure() {
            completion(Err(error));
            return;
        }
        self.blobs.lock().insert(
            destination.path().to_owned(),
            StoredBlob {
                bytes,
                content_type: content_type.to_owned(),
            },
        );
        completion(Ok(Self::upload_info(destination)));
    }

    fn put_file(&self, location: &Path, destination: &Reference, completion: UploadCompletion) {
        if let Some(error) = self.scripted_failure() {
            completion(Err(error));
            return;
        }
        // No filesystem in the testkit; the location string stands in for
        // the file content.
        self.blobs.lock().insert(
            destination.path().to_owned(),
            StoredBlob {
                bytes: location.to_string_lossy().into_owned().into_bytes(),
                content_type: "application/octet-stream".to_owned(),
            },
        );
        completion(Ok(Self::upload_info(destination)));
    }

    fn delete(&self, reference: &Reference, completion: DeleteCompletion) {
        if let Some(error) = self.scripted_failure() {
            completion(Err(error));
            return;
        }
        let removed = self.blobs.lock().remove(reference.path());
        match removed {
            Some(_) => completion(Ok(())),
            None => completion(Err(StoreError::Blob(format!(
                "no blob at {}",
                reference.path()
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn upload_then_delete() {
        let store = MemoryBlobStore::new();
        let destination = Reference::new("avatars/u1.png");

        let (tx, rx) = mpsc::channel();
        store.put_bytes(
            vec![1, 2, 3],
            "image/png",
            &destination,
            Box::new(move |result| tx.send(result).unwrap()),
        );
        let info = rx.recv().unwrap().unwrap();
        assert_eq!(info.name, "u1.png");
        assert_eq!(info.download_location, "memory://avatars/u1.png");
        assert_eq!(
            store.blob_at(&destination).unwrap().content_type,
            "image/png"
        );

        let (tx, rx) = mpsc::channel();
        store.delete(&destination, Box::new(move |result| tx.send(result).unwrap()));
        rx.recv().unwrap().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn deleting_a_missing_blob_errors() {
        let store = MemoryBlobStore::new();
        let (tx, rx) = mpsc::channel();
        store.delete(
            &Reference::new("nope"),
            Box::new(move |result| tx.send(result).unwrap()),
        );
        assert!(rx.recv().unwrap().is_err());
    }

    #[test]
    fn scripted_failure_reaches_the_completion() {
        let store = MemoryBlobStore::new();
        store.fail_with(StoreError::Blob("quota exceeded".into()));

        let (tx, rx) = mpsc::channel();
        store.put_bytes(
            vec![0],
            "text/plain",
            &Reference::new("f"),
            Box::new(move |result| tx.send(result).unwrap()),
        );
        assert_eq!(
            rx.recv().unwrap(),
            Err(StoreError::Blob("quota exceeded".into()))
        );
        assert!(store.is_empty());
    }
}
