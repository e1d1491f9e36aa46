use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::path::MediaPath;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Path-keyed blob storage.
///
/// The store owns a subtree of files addressed by [`MediaPath`]; records
/// persist those paths as canonical references. Writing twice to the same
/// path replaces the previous content.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at the given path, replacing any existing blob.
    async fn save(&self, path: &MediaPath, data: &[u8]) -> Result<(), StorageError>;

    /// Retrieve a blob as a streaming async reader.
    async fn read_stream(&self, path: &MediaPath) -> Result<BoxReader, StorageError>;

    /// Retrieve all bytes for a blob.
    async fn read(&self, path: &MediaPath) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.read_stream(path).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Check whether a blob exists.
    async fn exists(&self, path: &MediaPath) -> Result<bool, StorageError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it was already
    /// absent. Absence is not an error: a delete scheduled by reconciliation
    /// is satisfied either way.
    async fn delete(&self, path: &MediaPath) -> Result<bool, StorageError>;

    /// Delete every blob under a folder prefix, including the folder itself.
    async fn delete_prefix(&self, prefix: &MediaPath) -> Result<(), StorageError>;

    /// Get the size of a blob in bytes.
    async fn size(&self, path: &MediaPath) -> Result<u64, StorageError>;
}
