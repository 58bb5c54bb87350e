use crate::keys::BlobKey;
use crate::traits::{
    BlobDownload, BlobEntry, BlobReader, Storage, StorageError, StorageResult, StoredBlob,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const TEMP_PREFIX: &str = ".upload-";
const TEMP_SUFFIX: &str = ".part";

/// Local filesystem storage implementation
///
/// Blobs live flat under one root directory. Writes go to a hidden temporary file in
/// the same directory and are renamed into place only after the data is synced, so a
/// reader never sees a partial blob. Dropping an in-flight `put` removes the
/// temporary file.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
    max_blob_bytes: Option<u64>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            root,
            max_blob_bytes: None,
        })
    }

    /// Refuse blobs larger than `max` bytes. At most `max + 1` bytes are read from a
    /// `put` reader before giving up.
    pub fn with_max_blob_bytes(mut self, max: u64) -> Self {
        self.max_blob_bytes = Some(max);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert a blob key to its filesystem path
    fn key_to_path(&self, key: &BlobKey) -> StorageResult<PathBuf> {
        let name = key.filename();
        if name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, key: &BlobKey, reader: BlobReader) -> StorageResult<StoredBlob> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        // The root may have been removed since startup.
        fs::create_dir_all(&self.root).await?;

        let temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.root)
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create temporary file in {}: {}",
                    self.root.display(),
                    e
                ))
            })?;
        let mut file = fs::File::from_std(temp.as_file().try_clone()?);

        let limit = self
            .max_blob_bytes
            .map(|max| max.saturating_add(1))
            .unwrap_or(u64::MAX);
        let mut limited = reader.take(limit);

        let bytes_written = tokio::io::copy(&mut limited, &mut file)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write stream for {}: {}",
                    key, e
                ))
            })?;

        if let Some(max) = self.max_blob_bytes {
            if bytes_written > max {
                tracing::warn!(key = %key, max_bytes = max, "Blob exceeded size limit, discarding");
                return Err(StorageError::TooLarge { max });
            }
        }

        file.flush().await?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync blob {}: {}", key, e))
        })?;
        drop(file);

        temp.persist_noclobber(&path).map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to commit blob {}: {}",
                path.display(),
                e.error
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload committed"
        );

        Ok(StoredBlob {
            key: key.clone(),
            size_bytes: bytes_written,
        })
    }

    async fn get(&self, key: &BlobKey) -> StorageResult<BlobDownload> {
        let path = self.key_to_path(key)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.filename()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        let size_bytes = file.metadata().await?.len();

        let key_display = key.filename();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(key = %key_display, error = %e, "Local storage stream read error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        tracing::debug!(key = %key, size_bytes, "Local storage download opened");

        Ok(BlobDownload {
            filename: key.filename(),
            size_bytes,
            stream: Box::pin(stream),
        })
    }

    async fn delete(&self, key: &BlobKey) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "Local storage blob deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &BlobKey) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn list(&self) -> StorageResult<Vec<BlobEntry>> {
        let mut entries = Vec::new();
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(key) = name.to_str().and_then(BlobKey::parse) else {
                continue;
            };
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            entries.push(BlobEntry {
                key,
                size_bytes: metadata.len(),
                modified: metadata.modified()?,
            });
        }

        Ok(entries)
    }

    async fn purge_incomplete(&self, older_than: SystemTime) -> StorageResult<usize> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !(name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() || metadata.modified()? >= older_than {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Failed to remove incomplete upload");
                }
            }
        }

        Ok(removed)
    }

    async fn health_check(&self) -> StorageResult<()> {
        let metadata = fs::metadata(&self.root).await?;
        if !metadata.is_dir() {
            return Err(StorageError::ConfigError(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
