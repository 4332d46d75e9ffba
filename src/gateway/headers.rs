//! Response header shaping.
//!
//! The base set (cache policy plus permissive CORS) goes on every response,
//! errors included, so edge caches absorb repeated misses and rejected
//! methods. Object headers are layered on top for hits.

use hyper::HeaderMap;
use hyper::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    CACHE_CONTROL, CONTENT_LENGTH, ETAG, HeaderName, HeaderValue,
};
use serde::Deserialize;
use tracing::warn;

use crate::constants;
use crate::store::ObjectMeta;

/// Methods the gateway answers.
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Request headers browsers may send cross-origin.
pub const ALLOWED_HEADERS: &str = "Content-Type, Range";

/// Response headers exposed to cross-origin scripts and players.
pub const EXPOSED_HEADERS: &str = "Content-Length, Content-Range, Accept-Ranges, ETag";

/// Browser and edge cache lifetimes for served objects.
///
/// Objects are immutable per key: a new version must be written under a new
/// key, never overwritten in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CachePolicy {
    /// Browser cache lifetime in seconds.
    #[serde(default = "default_max_age")]
    pub max_age: u64,
    /// Shared (CDN) cache lifetime in seconds.
    #[serde(default = "default_s_maxage")]
    pub s_maxage: u64,
}

fn default_max_age() -> u64 {
    constants::DEFAULT_MAX_AGE_SECS
}

fn default_s_maxage() -> u64 {
    constants::DEFAULT_S_MAXAGE_SECS
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_age: default_max_age(),
            s_maxage: default_s_maxage(),
        }
    }
}

impl CachePolicy {
    /// The `Cache-Control` value for this policy.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!(
            "public, max-age={}, s-maxage={}, immutable",
            self.max_age, self.s_maxage
        )
    }
}

/// Precomputed base header set.
#[derive(Debug, Clone)]
pub struct BaseHeaders {
    cache_control: HeaderValue,
}

impl BaseHeaders {
    pub fn new(policy: CachePolicy) -> Self {
        // Digits, commas, and ASCII letters only: always a valid header value.
        let cache_control = HeaderValue::from_str(&policy.header_value())
            .unwrap_or_else(|_| HeaderValue::from_static(constants::DEFAULT_CACHE_CONTROL));
        Self { cache_control }
    }

    /// Cache-Control plus CORS. Attached to every response.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(CACHE_CONTROL, self.cache_control.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(EXPOSED_HEADERS),
        );
    }

    /// Base headers plus the preflight max-age.
    pub fn apply_preflight(&self, headers: &mut HeaderMap) {
        self.apply(headers);
        headers.insert(
            ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(constants::PREFLIGHT_MAX_AGE_SECS),
        );
    }
}

/// Object headers for a hit: ETag, Content-Length, the store's HTTP
/// metadata (which overrides anything set before it), and Accept-Ranges.
pub fn apply_object_headers(headers: &mut HeaderMap, meta: &ObjectMeta) {
    if let Some(etag) = &meta.etag {
        insert_checked(headers, ETAG, etag, &meta.key);
    }
    headers.insert(CONTENT_LENGTH, HeaderValue::from(meta.size));

    for (name, value) in meta.http.header_pairs() {
        insert_checked(headers, HeaderName::from_static(name), value, &meta.key);
    }

    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
}

/// Inserts a store-provided value, skipping it if it is not a legal header.
fn insert_checked(headers: &mut HeaderMap, name: HeaderName, value: &str, key: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        },
        Err(_) => {
            warn!(%key, header = %name, "Skipping invalid header value from store");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::HttpMetadata;
    use hyper::header::{CONTENT_DISPOSITION, CONTENT_TYPE};

    fn meta() -> ObjectMeta {
        ObjectMeta {
            key: "videos/a.mp4".into(),
            size: 1000,
            etag: Some("\"abc\"".into()),
            http: HttpMetadata {
                content_type: Some("video/mp4".into()),
                content_disposition: Some("inline".into()),
                ..HttpMetadata::default()
            },
        }
    }

    #[test]
    fn test_default_cache_control() {
        assert_eq!(
            CachePolicy::default().header_value(),
            "public, max-age=86400, s-maxage=2592000, immutable"
        );
        assert_eq!(
            constants::DEFAULT_CACHE_CONTROL,
            CachePolicy::default().header_value()
        );
    }

    #[test]
    fn test_base_headers() {
        let mut headers = HeaderMap::new();
        BaseHeaders::new(CachePolicy::default()).apply(&mut headers);

        assert_eq!(
            headers[CACHE_CONTROL],
            "public, max-age=86400, s-maxage=2592000, immutable"
        );
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, HEAD, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Range");
        assert!(headers.get(ACCESS_CONTROL_MAX_AGE).is_none());
    }

    #[test]
    fn test_custom_policy() {
        let mut headers = HeaderMap::new();
        BaseHeaders::new(CachePolicy {
            max_age: 60,
            s_maxage: 600,
        })
        .apply(&mut headers);
        assert_eq!(
            headers[CACHE_CONTROL],
            "public, max-age=60, s-maxage=600, immutable"
        );
    }

    #[test]
    fn test_object_headers() {
        let mut headers = HeaderMap::new();
        apply_object_headers(&mut headers, &meta());

        assert_eq!(headers[ETAG], "\"abc\"");
        assert_eq!(headers[CONTENT_LENGTH], "1000");
        assert_eq!(headers[CONTENT_TYPE], "video/mp4");
        assert_eq!(headers[CONTENT_DISPOSITION], "inline");
        assert_eq!(headers[ACCEPT_RANGES], "bytes");
    }

    #[test]
    fn test_store_metadata_overrides_base() {
        let mut headers = HeaderMap::new();
        BaseHeaders::new(CachePolicy::default()).apply(&mut headers);

        let mut meta = meta();
        meta.http.cache_control = Some("no-store".into());
        apply_object_headers(&mut headers, &meta);

        assert_eq!(headers[CACHE_CONTROL], "no-store");
    }

    #[test]
    fn test_invalid_store_values_are_skipped() {
        let mut headers = HeaderMap::new();
        let mut meta = meta();
        meta.etag = Some("bad\nvalue".into());
        apply_object_headers(&mut headers, &meta);

        assert!(headers.get(ETAG).is_none());
        assert_eq!(headers[CONTENT_LENGTH], "1000");
    }
}
