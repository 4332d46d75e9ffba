//! Object bodies and range streaming.
//!
//! A body is handed out unread by the store. The gateway decides the range
//! once it knows the object size, then turns the body into a stream that
//! yields only those bytes:
//! - in-memory bodies are sliced without copying
//! - file bodies seek to the start and stop after the range length

use std::io::{self, SeekFrom};
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::types::ByteRange;

/// Chunk size used when streaming file bodies.
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// A stream of body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// An unread object body.
#[derive(Debug)]
pub enum ObjectBody {
    /// Body held in memory.
    Bytes(Bytes),
    /// Open file positioned at the start of the object.
    File(tokio::fs::File),
}

impl ObjectBody {
    /// Turns the body into a stream over the whole object or over `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range lies outside an in-memory body or the
    /// file cannot be seeked.
    pub async fn into_stream(self, range: Option<ByteRange>) -> io::Result<BodyStream> {
        match self {
            Self::Bytes(bytes) => {
                let chunk = match range {
                    Some(range) => slice_bytes(&bytes, range)?,
                    None => bytes,
                };
                Ok(Box::pin(futures::stream::once(async move { Ok(chunk) })))
            },
            Self::File(mut file) => match range {
                Some(range) => {
                    file.seek(SeekFrom::Start(range.start)).await?;
                    Ok(Box::pin(ReaderStream::with_capacity(
                        file.take(range.len()),
                        STREAM_CHUNK_SIZE,
                    )))
                },
                None => Ok(Box::pin(ReaderStream::with_capacity(
                    file,
                    STREAM_CHUNK_SIZE,
                ))),
            },
        }
    }
}

fn slice_bytes(bytes: &Bytes, range: ByteRange) -> io::Result<Bytes> {
    let out_of_bounds = || {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "range {}-{} outside body of {} bytes",
                range.start,
                range.end,
                bytes.len()
            ),
        )
    };
    let start = usize::try_from(range.start).map_err(|_| out_of_bounds())?;
    let end = usize::try_from(range.end).map_err(|_| out_of_bounds())?;
    if start > end || end >= bytes.len() {
        return Err(out_of_bounds());
    }
    Ok(bytes.slice(start..=end))
}
