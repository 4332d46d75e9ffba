//! Backend trait for object stores.
//!
//! Defines the interface the gateway looks objects up through, enabling
//! pluggable storage (filesystem, memory, remote buckets, test doubles).

use async_trait::async_trait;
use std::sync::Arc;

use super::error::Result;
use super::types::{ObjectMeta, StoredObject};

/// Read side of an object store.
///
/// All backends must be thread-safe (`Send + Sync`) for use with tokio.
/// A miss is `Ok(None)`; `Err` is reserved for backend failures.
///
/// # Example
///
/// ```ignore
/// use mediagate::store::{MemoryStore, ObjectStore, HttpMetadata};
///
/// let store = MemoryStore::new();
/// store.put("videos/a.mp4", bytes, HttpMetadata::with_content_type("video/mp4"));
/// let object = store.get("videos/a.mp4").await?.unwrap();
/// ```
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Looks up an object and returns its metadata with an unread body.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or fails.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>>;

    /// Retrieves object metadata without opening the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or fails.
    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>>;
}

#[async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        (**self).get(key).await
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>> {
        (**self).head(key).await
    }
}
