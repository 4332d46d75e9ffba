//! Metadata database operations for the filesystem store.
//!
//! Each object key maps to a JSON-encoded [`MetadataRecord`] in redb. Sizes
//! are not recorded: the file on disk is authoritative for length.

use redb::{Database, ReadableDatabase, TableDefinition};
use serde::{Deserialize, Serialize};

use super::error::{Result, StoreError};
use super::types::HttpMetadata;

/// Table for object metadata storage.
pub(crate) const OBJECTS_TABLE: TableDefinition<'static, &'static str, &'static [u8]> =
    TableDefinition::new("objects");

/// Persisted metadata for one object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct MetadataRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub http: HttpMetadata,
}

/// Creates the objects table if it does not exist yet.
pub(crate) fn init_table(db: &Database) -> Result<()> {
    let write_txn = db.begin_write().map_err(StoreError::metadata)?;
    {
        let _table = write_txn
            .open_table(OBJECTS_TABLE)
            .map_err(StoreError::metadata)?;
    }
    write_txn.commit().map_err(StoreError::metadata)?;
    Ok(())
}

/// Saves object metadata to the database.
pub(crate) fn save_metadata(db: &Database, key: &str, record: &MetadataRecord) -> Result<()> {
    let json = serde_json::to_vec(record).map_err(|source| StoreError::CorruptMetadata {
        key: key.to_string(),
        source,
    })?;

    let write_txn = db.begin_write().map_err(StoreError::metadata)?;
    {
        let mut table = write_txn
            .open_table(OBJECTS_TABLE)
            .map_err(StoreError::metadata)?;
        table
            .insert(key, json.as_slice())
            .map_err(StoreError::metadata)?;
    }
    write_txn.commit().map_err(StoreError::metadata)?;

    Ok(())
}

/// Loads object metadata from the database.
pub(crate) fn load_metadata(db: &Database, key: &str) -> Result<Option<MetadataRecord>> {
    let read_txn = db.begin_read().map_err(StoreError::metadata)?;
    let table = read_txn
        .open_table(OBJECTS_TABLE)
        .map_err(StoreError::metadata)?;

    match table.get(key).map_err(StoreError::metadata)? {
        Some(guard) => serde_json::from_slice(guard.value())
            .map(Some)
            .map_err(|source| StoreError::CorruptMetadata {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_db() -> (Database, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db = Database::create(tmp.path().join("metadata.redb")).unwrap();
        init_table(&db).unwrap();
        (db, tmp)
    }

    #[test]
    fn test_save_and_load() {
        let (db, _tmp) = open_db();
        let record = MetadataRecord {
            etag: Some("\"abc\"".into()),
            http: HttpMetadata::with_content_type("video/mp4"),
        };
        save_metadata(&db, "videos/a.mp4", &record).unwrap();

        let loaded = load_metadata(&db, "videos/a.mp4").unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_load_missing() {
        let (db, _tmp) = open_db();
        assert!(load_metadata(&db, "nope").unwrap().is_none());
    }

    #[test]
    fn test_overwrite_replaces_record() {
        let (db, _tmp) = open_db();
        save_metadata(&db, "k", &MetadataRecord::default()).unwrap();
        let updated = MetadataRecord {
            etag: Some("\"v2\"".into()),
            http: HttpMetadata::default(),
        };
        save_metadata(&db, "k", &updated).unwrap();
        assert_eq!(load_metadata(&db, "k").unwrap().unwrap(), updated);
    }
}
