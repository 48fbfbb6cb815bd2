//! Filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use ferry_core::config::FsConfig;
use ferry_core::error::{AppError, ErrorKind};
use ferry_core::result::AppResult;
use ferry_core::traits::storage::{FileData, StorageProvider};

/// Filesystem storage provider.
///
/// Reads from `source_root` and writes to `destination_root`, typically
/// two mounted persistent volumes.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    source_root: PathBuf,
    destination_root: PathBuf,
}

impl LocalStorageProvider {
    pub fn new(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
        }
    }

    pub fn from_config(config: &FsConfig) -> Self {
        Self::new(&config.source.pv_path, &config.destination.pv_path)
    }

    /// Resolve a relative path under `root`.
    ///
    /// Leading slashes are ignored; `..` components are rejected so a task
    /// cannot address files outside the configured volume.
    fn resolve(root: &Path, path: &str) -> AppResult<PathBuf> {
        let clean = Path::new(path.trim_start_matches('/'));
        if clean
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AppError::invariant_violation(format!(
                "Path {path} escapes the storage root"
            )));
        }
        Ok(root.join(clean))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Io,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "fs"
    }

    async fn fetch(&self, path: &str) -> AppResult<FileData> {
        let full_path = Self::resolve(&self.source_root, path)?;

        // Checked before open; a concurrent delete still surfaces as Io below.
        let present = fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Io, format!("Failed to stat file: {path}"), e)
        })?;
        if !present {
            return Err(AppError::not_found(format!(
                "File {path} doesn't exist in {}",
                self.source_root.display()
            )));
        }

        let file = fs::File::open(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Io, format!("Failed to open file: {path}"), e)
        })?;
        let length = file
            .metadata()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Io, format!("Failed to stat file: {path}"), e)
            })?
            .len();

        debug!(path, bytes = length, "Opened source file");
        Ok(FileData::new(Box::pin(ReaderStream::new(file)), Some(length)))
    }

    async fn store(&self, path: &str, data: FileData) -> AppResult<u64> {
        let full_path = Self::resolve(&self.destination_root, path)?;
        self.ensure_parent(&full_path).await?;

        let mut file = fs::File::create(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Io, format!("Failed to create file: {path}"), e)
        })?;

        let mut stream = data.content;
        let mut total_bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(ErrorKind::Io, format!("Stream read error: {path}"), e)
            })?;
            total_bytes += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::Io, format!("Failed to write file: {path}"), e)
            })?;
        }

        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Io, "Failed to flush file", e))?;

        debug!(path, bytes = total_bytes, "Wrote file from stream");
        Ok(total_bytes)
    }
}
