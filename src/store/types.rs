//! Types shared by all object store backends.

use serde::{Deserialize, Serialize};

use super::body::ObjectBody;

/// HTTP metadata declared by the store for an object.
///
/// Every field that is set is copied onto the response as-is, after the
/// gateway's own headers, so the object's declared values win.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
}

impl HttpMetadata {
    /// Metadata with only a content type.
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Self::default()
        }
    }

    /// Header name/value pairs for every field that is set.
    pub fn header_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("content-type", self.content_type.as_deref()),
            ("content-disposition", self.content_disposition.as_deref()),
            ("content-encoding", self.content_encoding.as_deref()),
            ("content-language", self.content_language.as_deref()),
            ("cache-control", self.cache_control.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }
}

/// Metadata for a stored object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Storage key (e.g., "videos/a.mp4")
    pub key: String,
    /// Size in bytes
    pub size: u64,
    /// Entity tag, already quoted (e.g., `"9f86d0..."`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub http: HttpMetadata,
}

/// An object returned by a lookup: metadata plus an unread body.
#[derive(Debug)]
pub struct StoredObject {
    pub meta: ObjectMeta,
    pub body: ObjectBody,
}

/// An inclusive byte range `start..=end` that has already been checked
/// against the object size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false: a resolved range covers at least one byte.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// `Content-Range` value for this range of an object of `size` bytes.
    #[must_use]
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

/// Quoted entity tag for `data`: the BLAKE3 digest in hex.
pub fn content_etag(data: &[u8]) -> String {
    format!("\"{}\"", hex::encode(blake3::hash(data).as_bytes()))
}

/// Content type guessed from the key's extension.
pub(crate) fn guess_content_type(key: &str) -> String {
    mime_guess::from_path(key).first().map_or_else(
        || "application/octet-stream".to_string(),
        |mime| mime.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_range_len_and_content_range() {
        let range = ByteRange { start: 0, end: 99 };
        assert_eq!(range.len(), 100);
        assert_eq!(range.content_range(1000), "bytes 0-99/1000");

        let single = ByteRange { start: 7, end: 7 };
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_header_pairs_skips_unset_fields() {
        let http = HttpMetadata {
            content_type: Some("video/mp4".into()),
            content_disposition: Some("inline".into()),
            ..HttpMetadata::default()
        };
        let pairs: Vec<_> = http.header_pairs().collect();
        assert_eq!(
            pairs,
            vec![("content-type", "video/mp4"), ("content-disposition", "inline")]
        );
    }

    #[test]
    fn test_content_etag_is_quoted_and_stable() {
        let a = content_etag(b"hello");
        let b = content_etag(b"hello");
        assert_eq!(a, b);
        assert!(a.starts_with('"') && a.ends_with('"'));
        assert_eq!(a.len(), 64 + 2);
        assert_ne!(a, content_etag(b"world"));
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("videos/a.mp4"), "video/mp4");
        assert_eq!(guess_content_type("img/logo.png"), "image/png");
        assert_eq!(guess_content_type("blob"), "application/octet-stream");
    }
}
