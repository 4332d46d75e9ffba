//! Request path to storage key.

use percent_encoding::percent_decode_str;

use super::error::GatewayError;

/// Derives the storage key from a request path.
///
/// The path is percent-decoded and at most one leading `/` is removed.
/// Nothing else is normalized; namespace safety belongs to the store.
///
/// # Errors
///
/// Returns [`GatewayError::EmptyKey`] for the bare root and
/// [`GatewayError::InvalidKey`] when the decoded bytes are not UTF-8.
///
/// # Examples
///
/// ```
/// use mediagate::gateway::storage_key;
///
/// assert_eq!(storage_key("/videos/a%20b.mp4").unwrap(), "videos/a b.mp4");
/// assert_eq!(storage_key("//double").unwrap(), "/double");
/// assert!(storage_key("/").is_err());
/// ```
pub fn storage_key(path: &str) -> Result<String, GatewayError> {
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|e| GatewayError::InvalidKey(e.to_string()))?;

    let key = decoded.strip_prefix('/').unwrap_or(&*decoded);
    if key.is_empty() {
        return Err(GatewayError::EmptyKey);
    }

    Ok(key.to_string())
}
