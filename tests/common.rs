//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::{Request, Response};

use mediagate::MediaGateway;
use mediagate::gateway::GatewayBody;
use mediagate::store::{
    HttpMetadata, MemoryStore, ObjectMeta, ObjectStore, StoreError, StoredObject,
};

/// Memory store wrapper that counts lookups and can be told to fail.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    gets: AtomicUsize,
    heads: AtomicUsize,
    failing: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of `get` calls so far.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `head` calls so far.
    pub fn heads(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }

    /// Make every subsequent lookup fail with a backend error.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn backend_error() -> StoreError {
        StoreError::io("mock backend", std::io::Error::other("backend unavailable"))
    }
}

#[async_trait]
impl ObjectStore for CountingStore {
    async fn get(&self, key: &str) -> mediagate::store::Result<Option<StoredObject>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Self::backend_error());
        }
        self.inner.get(key).await
    }

    async fn head(&self, key: &str) -> mediagate::store::Result<Option<ObjectMeta>> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Self::backend_error());
        }
        self.inner.head(key).await
    }
}

/// Deterministic test content of `size` bytes.
pub fn pattern(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// A gateway over a counting store holding `videos/a.mp4` (1000 bytes).
pub fn video_gateway() -> (MediaGateway, Arc<CountingStore>, Vec<u8>) {
    let store = CountingStore::new();
    let data = pattern(1000);
    store.inner.put(
        "videos/a.mp4",
        data.clone(),
        HttpMetadata::with_content_type("video/mp4"),
    );
    (MediaGateway::new(store.clone()), store, data)
}

pub fn request(method: &str, path: &str) -> Request<()> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(())
        .unwrap()
}

pub fn range_request(path: &str, range: &str) -> Request<()> {
    Request::get(path).header("range", range).body(()).unwrap()
}

/// Collect a gateway response body.
pub async fn body_bytes(response: Response<GatewayBody>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Header value as a string, or None.
pub fn header<B>(response: &Response<B>, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .map(|v| v.to_str().unwrap().to_string())
}

/// Assert the cache/CORS base set is present.
pub fn assert_base_headers<B>(response: &Response<B>) {
    assert_eq!(
        header(response, "cache-control").as_deref(),
        Some("public, max-age=86400, s-maxage=2592000, immutable")
    );
    assert_eq!(
        header(response, "access-control-allow-origin").as_deref(),
        Some("*")
    );
    assert_eq!(
        header(response, "access-control-allow-methods").as_deref(),
        Some("GET, HEAD, OPTIONS")
    );
    assert_eq!(
        header(response, "access-control-allow-headers").as_deref(),
        Some("Content-Type, Range")
    );
}
