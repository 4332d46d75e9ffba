//! Object stores the gateway reads from.
//!
//! The gateway only depends on the [`ObjectStore`] trait and performs a
//! single lookup per request: `get` for GET, `head` for HEAD. Two backends are provided:
//! - [`MemoryStore`]: DashMap-backed, for tests and embedding
//! - [`FilesystemStore`]: files on disk with a redb metadata sidecar
//!
//! Writing objects is not part of the trait. Both backends expose an
//! inherent `put` for seeding; production ingestion happens elsewhere.

mod backend;
mod body;
mod error;
mod filesystem;
mod memory;
mod metadata;
mod types;
mod validation;

pub use backend::ObjectStore;
pub use body::{BodyStream, ObjectBody, STREAM_CHUNK_SIZE};
pub use error::{Result, StoreError};
pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;
pub use types::{ByteRange, HttpMetadata, ObjectMeta, StoredObject, content_etag};
