//! Media range-serving gateway.
//!
//! Translates one HTTP request into at most one object store lookup and
//! shapes the result into a cacheable response:
//! - `OPTIONS` is answered with 204 before anything else, without a lookup
//! - methods other than GET/HEAD/OPTIONS get 405
//! - the path becomes the storage key (400 when empty)
//! - misses are 404, store failures 500
//! - hits get cache, CORS, ETag, length, and store metadata headers
//! - `HEAD` returns the headers only and never 206
//! - `GET` with a single `bytes=` range returns 206 with exactly that slice
//!
//! The handler is stateless between requests and runtime-agnostic: the
//! store is injected, and the function only needs a request's method, path,
//! and `Range` header.
//!
//! # Example
//!
//! ```no_run
//! use mediagate::gateway::MediaGateway;
//! use mediagate::store::{HttpMetadata, MemoryStore};
//!
//! # async fn example() {
//! let store = MemoryStore::new();
//! store.put("videos/a.mp4", vec![0u8; 1000], HttpMetadata::default());
//!
//! let gateway = MediaGateway::new(store);
//! let request = hyper::Request::get("/videos/a.mp4")
//!     .header("range", "bytes=0-99")
//!     .body(())
//!     .unwrap();
//! let response = gateway.handle(&request).await;
//! assert_eq!(response.status(), 206);
//! # }
//! ```

pub mod error;
pub mod headers;
pub mod key;
pub mod range;

pub use error::GatewayError;
pub use headers::{BaseHeaders, CachePolicy};
pub use key::storage_key;
pub use range::{RangeError, RangeSpec, parse_range_header};

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, HeaderValue, RANGE,
};
use hyper::{Method, Request, Response, StatusCode};
use tracing::{debug, error};

use crate::metrics;
use crate::store::{self, BodyStream, ByteRange, ObjectMeta, ObjectStore, StoredObject};
use headers::{ALLOWED_METHODS, apply_object_headers};

/// Response body produced by the gateway.
pub type GatewayBody = UnsyncBoxBody<Bytes, io::Error>;

/// The gateway: an injected object store plus a cache policy.
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct MediaGateway {
    store: Arc<dyn ObjectStore>,
    base: BaseHeaders,
}

impl MediaGateway {
    /// Creates a gateway over `store` with the default cache policy.
    pub fn new(store: impl ObjectStore) -> Self {
        Self::from_arc(Arc::new(store))
    }

    /// Creates a gateway over an already shared store.
    pub fn from_arc(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            base: BaseHeaders::new(CachePolicy::default()),
        }
    }

    /// Replaces the cache policy.
    #[must_use]
    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.base = BaseHeaders::new(policy);
        self
    }

    /// Handles one request. Never fails: every error becomes a response
    /// carrying the base headers.
    pub async fn handle<B>(&self, req: &Request<B>) -> Response<GatewayBody> {
        let response = match self.route(req).await {
            Ok(response) => response,
            Err(e) => {
                let (method, path) = (req.method(), req.uri().path());
                if e.is_server_error() {
                    error!(%method, path, error = %e, "Request failed");
                } else {
                    debug!(%method, path, error = %e, "Request rejected");
                }
                self.error_response(req.method(), &e)
            },
        };

        metrics::record_response(response.status().as_u16());
        response
    }

    async fn route<B>(&self, req: &Request<B>) -> error::Result<Response<GatewayBody>> {
        let method = req.method();
        if method == Method::OPTIONS {
            return Ok(self.preflight_response());
        }
        if method != Method::GET && method != Method::HEAD {
            return Err(GatewayError::MethodNotAllowed(method.clone()));
        }

        let key = storage_key(req.uri().path())?;
        if method == Method::HEAD {
            let meta = record_lookup(&key, self.store.head(&key).await)?;
            return Ok(self.head_response(&meta));
        }

        let object = record_lookup(&key, self.store.get(&key).await)?;
        let range = match req.headers().get(RANGE) {
            None => None,
            Some(value) => Some(resolve_range(&key, object.meta.size, value)?),
        };
        self.body_response(object, range).await
    }

    fn preflight_response(&self) -> Response<GatewayBody> {
        let mut response = Response::new(empty_body());
        *response.status_mut() = StatusCode::NO_CONTENT;
        self.base.apply_preflight(response.headers_mut());
        response
    }

    fn head_response(&self, meta: &ObjectMeta) -> Response<GatewayBody> {
        let mut response = Response::new(empty_body());
        self.base.apply(response.headers_mut());
        apply_object_headers(response.headers_mut(), meta);
        response
    }

    async fn body_response(
        &self,
        object: StoredObject,
        range: Option<ByteRange>,
    ) -> error::Result<Response<GatewayBody>> {
        let StoredObject { meta, body } = object;
        let stream = body
            .into_stream(range)
            .await
            .map_err(|source| GatewayError::Body {
                key: meta.key.clone(),
                source,
            })?;

        let mut response = Response::new(stream_body(stream));
        let headers = response.headers_mut();
        self.base.apply(headers);
        apply_object_headers(headers, &meta);

        let served = match range {
            Some(range) => {
                *response.status_mut() = StatusCode::PARTIAL_CONTENT;
                let headers = response.headers_mut();
                headers.insert(CONTENT_LENGTH, HeaderValue::from(range.len()));
                if let Ok(value) = HeaderValue::from_str(&range.content_range(meta.size)) {
                    headers.insert(CONTENT_RANGE, value);
                }
                range.len()
            },
            None => meta.size,
        };

        debug!(key = %meta.key, status = %response.status(), bytes = served, "Serving object");
        metrics::record_bytes_served(served);
        Ok(response)
    }

    fn error_response(&self, method: &Method, err: &GatewayError) -> Response<GatewayBody> {
        let body = if method == Method::HEAD {
            empty_body()
        } else {
            text_body(err.public_message())
        };

        let mut response = Response::new(body);
        *response.status_mut() = err.status_code();
        let headers = response.headers_mut();
        self.base.apply(headers);
        if method != Method::HEAD {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
        }

        match err {
            GatewayError::MethodNotAllowed(_) => {
                headers.insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
            },
            GatewayError::RangeNotSatisfiable { size, .. } => {
                headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
                if let Ok(value) = HeaderValue::from_str(&format!("bytes */{size}")) {
                    headers.insert(CONTENT_RANGE, value);
                }
            },
            _ => {},
        }

        response
    }
}

/// Turns a store lookup into a hit or a typed miss, counting the outcome.
fn record_lookup<T>(key: &str, result: store::Result<Option<T>>) -> error::Result<T> {
    match result {
        Ok(Some(found)) => {
            metrics::record_lookup("hit");
            Ok(found)
        },
        Ok(None) => {
            metrics::record_lookup("miss");
            Err(GatewayError::NotFound {
                key: key.to_string(),
            })
        },
        Err(e) => {
            metrics::record_lookup("error");
            Err(e.into())
        },
    }
}

/// Parses and resolves a `Range` header against the object size.
fn resolve_range(key: &str, size: u64, value: &HeaderValue) -> error::Result<ByteRange> {
    let unsatisfiable = |source: RangeError| GatewayError::RangeNotSatisfiable {
        key: key.to_string(),
        size,
        source,
    };

    let value = value
        .to_str()
        .map_err(|e| unsatisfiable(RangeError::Malformed(e.to_string())))?;
    parse_range_header(value)
        .and_then(|spec| spec.resolve(size))
        .map_err(unsatisfiable)
}

fn empty_body() -> GatewayBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

fn text_body(text: &'static str) -> GatewayBody {
    Full::new(Bytes::from_static(text.as_bytes()))
        .map_err(|never| match never {})
        .boxed_unsync()
}

fn stream_body(stream: BodyStream) -> GatewayBody {
    StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync()
}
