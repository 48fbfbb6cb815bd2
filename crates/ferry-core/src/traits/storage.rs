//! Storage provider trait for pluggable transfer backends.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};

use crate::result::AppResult;

/// A byte stream type used for file contents in flight.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// One file's content while it moves from source to destination.
pub struct FileData {
    /// The file content.
    pub content: ByteStream,
    /// Content length in bytes, when the backend reported one.
    pub length: Option<u64>,
}

impl FileData {
    pub fn new(content: ByteStream, length: Option<u64>) -> Self {
        Self { content, length }
    }

    /// Wrap an in-memory buffer.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let length = Some(data.len() as u64);
        Self {
            content: Box::pin(futures::stream::once(async move { Ok(data) })),
            length,
        }
    }

    /// Drain the stream into a single buffer.
    pub async fn into_bytes(self) -> Result<Bytes, std::io::Error> {
        let capacity = self.length.unwrap_or(0) as usize;
        let buf = self
            .content
            .try_fold(Vec::with_capacity(capacity), |mut buf, chunk| async move {
                buf.extend_from_slice(&chunk);
                Ok(buf)
            })
            .await?;
        Ok(Bytes::from(buf))
    }
}

impl fmt::Debug for FileData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileData")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// Trait for transfer backends.
///
/// Each provider reads from its configured source location and writes to
/// its configured destination location; the same relative path addresses
/// an object on both sides. Implementations live in `ferry-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + fmt::Debug + 'static {
    /// Return the provider type name (`"fs"` or `"s3"`).
    fn provider_type(&self) -> &str;

    /// Read the object at `path` relative to the source location.
    async fn fetch(&self, path: &str) -> AppResult<FileData>;

    /// Write `data` to `path` relative to the destination location,
    /// overwriting any existing object. Returns the number of bytes written.
    async fn store(&self, path: &str, data: FileData) -> AppResult<u64>;
}
