//! Filesystem-backed object store.
//!
//! Objects live as plain files under `<base>/objects/`, and their HTTP
//! metadata and ETags are tracked in `<base>/metadata.redb`. Keeping the
//! database outside the objects directory means no key can address it.

use anyhow::{Context, bail};
use async_trait::async_trait;
use redb::Database;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::backend::ObjectStore;
use super::body::ObjectBody;
use super::error::{Result, StoreError};
use super::metadata::{MetadataRecord, init_table, load_metadata, save_metadata};
use super::types::{HttpMetadata, ObjectMeta, StoredObject, content_etag, guess_content_type};
use super::validation::object_path;

/// Subdirectory holding object files.
const OBJECTS_DIR: &str = "objects";

/// Metadata database file name.
const METADATA_DB: &str = "metadata.redb";

/// Filesystem-backed object store.
///
/// Bodies are returned as open file handles; range reads seek instead of
/// loading the object, so memory use does not grow with object size.
///
/// # Thread Safety
///
/// `FilesystemStore` is `Clone` and can be shared across tasks. The
/// underlying database handles concurrent access safely.
#[derive(Clone)]
pub struct FilesystemStore {
    objects_dir: PathBuf,
    db: Arc<Database>,
}

impl FilesystemStore {
    /// Creates or opens the store at the given base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The objects directory cannot be created
    /// - The metadata database cannot be opened or initialized
    pub fn open<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref();
        let objects_dir = base_dir.join(OBJECTS_DIR);

        std::fs::create_dir_all(&objects_dir).with_context(|| {
            format!(
                "Failed to create objects directory: {}",
                objects_dir.display()
            )
        })?;

        let db_path = base_dir.join(METADATA_DB);
        let db = Database::create(&db_path).with_context(|| {
            format!("Failed to open metadata database: {}", db_path.display())
        })?;
        init_table(&db).context("Failed to initialize objects table")?;

        debug!(base_dir = %base_dir.display(), "Opened filesystem store");

        Ok(Self {
            objects_dir,
            db: Arc::new(db),
        })
    }

    /// Directory that object keys resolve under.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Stores an object, replacing any previous object at `key`.
    ///
    /// The ETag is derived from the content. When `http` carries no content
    /// type, one is guessed from the key's extension.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key is not a safe relative path
    /// - Parent directories or the file cannot be written
    /// - Metadata cannot be saved to the database
    pub async fn put(
        &self,
        key: &str,
        data: &[u8],
        mut http: HttpMetadata,
    ) -> anyhow::Result<ObjectMeta> {
        let file_path = match object_path(&self.objects_dir, key) {
            Ok(path) => path,
            Err(reason) => bail!("Invalid object key '{key}': {reason}"),
        };

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create parent directories for: {key}"))?;
        }
        tokio::fs::write(&file_path, data)
            .await
            .with_context(|| format!("Failed to write object: {key}"))?;

        if http.content_type.is_none() {
            http.content_type = Some(guess_content_type(key));
        }
        let record = MetadataRecord {
            etag: Some(content_etag(data)),
            http,
        };

        let db = self.db.clone();
        let owned_key = key.to_string();
        let saved = record.clone();
        tokio::task::spawn_blocking(move || save_metadata(&db, &owned_key, &saved))
            .await
            .context("Task join error")?
            .with_context(|| format!("Failed to save metadata for: {key}"))?;

        Ok(ObjectMeta {
            key: key.to_string(),
            size: data.len() as u64,
            etag: record.etag,
            http: record.http,
        })
    }

    /// Maps a key to its file, or `None` when the key is outside the
    /// store's namespace.
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        match object_path(&self.objects_dir, key) {
            Ok(path) => Some(path),
            Err(reason) => {
                warn!(
                    target: "audit",
                    event_type = "invalid_key",
                    %key,
                    %reason,
                    "Storage key rejected"
                );
                None
            },
        }
    }

    /// Builds object metadata from the database record, falling back to a
    /// guessed content type and no ETag when the file was placed on disk
    /// directly.
    async fn build_meta(&self, key: &str, size: u64) -> Result<ObjectMeta> {
        let db = self.db.clone();
        let owned_key = key.to_string();
        let record = tokio::task::spawn_blocking(move || load_metadata(&db, &owned_key)).await??;

        let MetadataRecord { etag, http } = record.unwrap_or_else(|| MetadataRecord {
            etag: None,
            http: HttpMetadata::with_content_type(guess_content_type(key)),
        });

        Ok(ObjectMeta {
            key: key.to_string(),
            size,
            etag,
            http,
        })
    }
}

/// True for errors that mean "no object here" rather than a failure.
fn is_missing(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::NotFound | ErrorKind::NotADirectory)
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        let Some(path) = self.resolve(key) else {
            return Ok(None);
        };

        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if is_missing(e.kind()) => return Ok(None),
            Err(e) => return Err(StoreError::io(format!("opening object '{key}'"), e)),
        };
        let stat = file
            .metadata()
            .await
            .map_err(|e| StoreError::io(format!("reading metadata of '{key}'"), e))?;
        if !stat.is_file() {
            return Ok(None);
        }

        let meta = self.build_meta(key, stat.len()).await?;
        Ok(Some(StoredObject {
            meta,
            body: ObjectBody::File(file),
        }))
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>> {
        let Some(path) = self.resolve(key) else {
            return Ok(None);
        };

        let stat = match tokio::fs::metadata(&path).await {
            Ok(stat) => stat,
            Err(e) if is_missing(e.kind()) => return Ok(None),
            Err(e) => return Err(StoreError::io(format!("reading metadata of '{key}'"), e)),
        };
        if !stat.is_file() {
            return Ok(None);
        }

        self.build_meta(key, stat.len()).await.map(Some)
    }
}
