//! Key validation for the filesystem store.
//!
//! The gateway passes keys through untouched; the filesystem store is the
//! one place that maps keys onto real paths, so it refuses anything that
//! could escape the objects directory.

use std::path::{Component, Path, PathBuf};

/// Validates a storage key and converts it into a relative path.
///
/// # Security
/// Rejects keys that:
/// - Are empty
/// - Are absolute (start with `/` or a drive letter)
/// - Contain `..`, `.`, or empty segments
/// - Contain NUL or backslash characters
///
/// # Examples
/// ```ignore
/// relative_path("videos/a.mp4")     // Ok("videos/a.mp4")
/// relative_path("../etc/passwd")    // Err
/// relative_path("/etc/passwd")      // Err
/// relative_path("a//b")             // Err
/// ```
pub(crate) fn relative_path(key: &str) -> Result<PathBuf, String> {
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }
    if key.contains('\0') || key.contains('\\') {
        return Err("key cannot contain NUL or backslash".to_string());
    }
    if key.split('/').any(str::is_empty) {
        return Err("key cannot contain empty segments".to_string());
    }

    let path = Path::new(key);
    if path.is_absolute() {
        return Err("key cannot be absolute".to_string());
    }

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => normalized.push(name),
            Component::CurDir => return Err("key cannot contain '.'".to_string()),
            Component::ParentDir => return Err("key cannot contain '..'".to_string()),
            Component::RootDir | Component::Prefix(_) => {
                return Err("key cannot contain root or prefix".to_string());
            },
        }
    }

    Ok(normalized)
}

/// Returns the filesystem path for `key` under `objects_dir`.
pub(crate) fn object_path(objects_dir: &Path, key: &str) -> Result<PathBuf, String> {
    Ok(objects_dir.join(relative_path(key)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert_eq!(
            relative_path("videos/a.mp4").unwrap(),
            PathBuf::from("videos/a.mp4")
        );
        assert_eq!(relative_path("a").unwrap(), PathBuf::from("a"));
        assert_eq!(
            relative_path("with space/é.webm").unwrap(),
            PathBuf::from("with space/é.webm")
        );
    }

    #[test]
    fn test_traversal_keys_rejected() {
        let attack_keys = [
            "../etc/passwd",
            "../../etc/passwd",
            "videos/../../etc/passwd",
            "/etc/passwd",
            "./a.mp4",
            "a//b",
            "a/",
            "",
            "a\\..\\b",
            "a\0b",
        ];
        for key in &attack_keys {
            assert!(relative_path(key).is_err(), "accepted: {key:?}");
        }
    }

    #[test]
    fn test_object_path_joins_under_base() {
        let base = Path::new("/srv/media/objects");
        assert_eq!(
            object_path(base, "videos/a.mp4").unwrap(),
            PathBuf::from("/srv/media/objects/videos/a.mp4")
        );
    }
}
