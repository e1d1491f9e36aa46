use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::path::MediaPath;
use super::traits::{BlobStore, BoxReader};

/// Filesystem-backed blob store.
///
/// Blobs live under `{root}` at exactly their [`MediaPath`], so the on-disk
/// tree mirrors the entity hierarchy
/// (`categorys/<slug>-<id>/products/<slug>-<id>/<file>`). Writes go through
/// a temp file plus rename so a cancelled request never leaves a partial
/// file at a linked path.
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store rooted at `root`.
    pub async fn new(root: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root })
    }

    /// Compute the filesystem location for a media path.
    ///
    /// Safe to join directly: `MediaPath` admits no absolute or traversing
    /// form.
    fn file_path(&self, path: &MediaPath) -> PathBuf {
        self.root.join(path.as_str())
    }

    /// Location for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn save(&self, path: &MediaPath, data: &[u8]) -> Result<(), StorageError> {
        let file_path = self.file_path(path);

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &file_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn read_stream(&self, path: &MediaPath) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.file_path(path)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &MediaPath) -> Result<bool, StorageError> {
        Ok(fs::try_exists(&self.file_path(path)).await?)
    }

    async fn delete(&self, path: &MediaPath) -> Result<bool, StorageError> {
        match fs::remove_file(self.file_path(path)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_prefix(&self, prefix: &MediaPath) -> Result<(), StorageError> {
        match fs::remove_dir_all(self.file_path(prefix)).await {
            Ok(()) => {
                tracing::debug!(prefix = %prefix, "removed media folder");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, path: &MediaPath) -> Result<u64, StorageError> {
        match fs::metadata(self.file_path(path)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
