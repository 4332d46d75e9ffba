//! In-memory object store.
//!
//! Provides a fast, non-persistent store using DashMap for concurrent
//! access. Ideal for testing, development, and embedded use cases.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use super::backend::ObjectStore;
use super::body::ObjectBody;
use super::error::Result;
use super::types::{HttpMetadata, ObjectMeta, StoredObject, content_etag, guess_content_type};

/// Entry stored in the memory backend.
#[derive(Clone)]
struct MemoryObject {
    data: Bytes,
    meta: ObjectMeta,
}

/// In-memory object store using DashMap.
///
/// Keys are matched exactly; no path normalization happens here. Bodies
/// are reference-counted, so range reads slice without copying.
///
/// # Example
///
/// ```
/// use mediagate::store::{HttpMetadata, MemoryStore};
///
/// let store = MemoryStore::new();
/// let meta = store.put("clips/intro.mp4", vec![0u8; 1000], HttpMetadata::default());
/// assert_eq!(meta.size, 1000);
/// assert_eq!(meta.http.content_type.as_deref(), Some("video/mp4"));
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: DashMap<String, MemoryObject>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object, replacing any previous object at `key`.
    ///
    /// The ETag is derived from the content. When `http` carries no content
    /// type, one is guessed from the key's extension.
    pub fn put(&self, key: &str, data: impl Into<Bytes>, mut http: HttpMetadata) -> ObjectMeta {
        let data = data.into();
        if http.content_type.is_none() {
            http.content_type = Some(guess_content_type(key));
        }

        let meta = ObjectMeta {
            key: key.to_string(),
            size: data.len() as u64,
            etag: Some(content_etag(&data)),
            http,
        };

        self.data.insert(
            key.to_string(),
            MemoryObject {
                data,
                meta: meta.clone(),
            },
        );

        meta
    }

    /// Returns the number of objects in the store.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        Ok(self.data.get(key).map(|entry| {
            let obj = entry.value();
            StoredObject {
                meta: obj.meta.clone(),
                body: ObjectBody::Bytes(obj.data.clone()),
            }
        }))
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>> {
        Ok(self.data.get(key).map(|entry| entry.value().meta.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryStore::new();

        let meta = store.put(
            "test.txt",
            &b"Hello, World!"[..],
            HttpMetadata::with_content_type("text/plain"),
        );
        assert_eq!(meta.key, "test.txt");
        assert_eq!(meta.size, 13);
        assert_eq!(meta.http.content_type.as_deref(), Some("text/plain"));

        let object = store.get("test.txt").await.unwrap().unwrap();
        assert_eq!(object.meta, meta);
        let chunks: Vec<Bytes> = object
            .body
            .into_stream(None)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.concat(), b"Hello, World!");
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store = MemoryStore::new();
        assert!(store.get("nonexistent.txt").await.unwrap().is_none());
        assert!(store.head("nonexistent.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_match_exactly() {
        let store = MemoryStore::new();
        store.put("a/b.mp4", &b"x"[..], HttpMetadata::default());

        assert!(store.get("/a/b.mp4").await.unwrap().is_none());
        assert!(store.get("a//b.mp4").await.unwrap().is_none());
        assert!(store.get("a/b.mp4").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_content_type_auto_detection() {
        let store = MemoryStore::new();
        store.put("clip.webm", &b"w"[..], HttpMetadata::default());
        store.put("data", &b"d"[..], HttpMetadata::default());

        let webm = store.head("clip.webm").await.unwrap().unwrap();
        assert_eq!(webm.http.content_type.as_deref(), Some("video/webm"));

        let raw = store.head("data").await.unwrap().unwrap();
        assert_eq!(
            raw.http.content_type.as_deref(),
            Some("application/octet-stream")
        );
    }

    #[tokio::test]
    async fn test_overwrite_changes_etag() {
        let store = MemoryStore::new();
        let first = store.put("k", &b"original"[..], HttpMetadata::default());
        let second = store.put("k", &b"updated"[..], HttpMetadata::default());

        assert_ne!(first.etag, second.etag);
        assert_eq!(store.len(), 1);
        assert_eq!(store.head("k").await.unwrap().unwrap().size, 7);
    }
}
