//! Storage abstraction trait
//!
//! This module defines the Storage trait that all blob backends must implement.

use crate::keys::BlobKey;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::SystemTime;
use studio_core::AppError;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Blob exceeds {max} bytes")]
    TooLarge { max: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::TooLarge { max } => {
                AppError::PayloadTooLarge(format!("File exceeds maximum size of {} bytes", max))
            }
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::ConfigError(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::Storage(format!("IO error: {}", err)),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Inbound bytes for [`Storage::put`].
pub type BlobReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Outbound bytes from [`Storage::get`].
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// A blob that was fully written and is now visible to `get`.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub key: BlobKey,
    pub size_bytes: u64,
}

/// A readable blob plus what a client needs to save it.
pub struct BlobDownload {
    /// Suggested filename for `Content-Disposition`.
    pub filename: String,
    pub size_bytes: u64,
    pub stream: ByteStream,
}

impl std::fmt::Debug for BlobDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobDownload")
            .field("filename", &self.filename)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

/// Listing entry for committed blobs.
#[derive(Debug, Clone)]
pub struct BlobEntry {
    pub key: BlobKey,
    pub size_bytes: u64,
    pub modified: SystemTime,
}

/// Storage abstraction trait
///
/// A blob is visible to [`get`](Storage::get), [`exists`](Storage::exists) and
/// [`list`](Storage::list) only after [`put`](Storage::put) returned `Ok`. A failed
/// or cancelled `put` leaves nothing behind under the blob's name.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write the whole reader under `key`.
    async fn put(&self, key: &BlobKey, reader: BlobReader) -> StorageResult<StoredBlob>;

    /// Open a committed blob as a byte stream.
    async fn get(&self, key: &BlobKey) -> StorageResult<BlobDownload>;

    /// Delete a blob. Deleting a missing blob succeeds.
    async fn delete(&self, key: &BlobKey) -> StorageResult<()>;

    /// Check if a blob exists
    async fn exists(&self, key: &BlobKey) -> StorageResult<bool>;

    /// Enumerate committed blobs.
    async fn list(&self) -> StorageResult<Vec<BlobEntry>>;

    /// Remove leftovers of interrupted writes last touched before `older_than`.
    /// Returns how many were removed.
    async fn purge_incomplete(&self, _older_than: SystemTime) -> StorageResult<usize> {
        Ok(0)
    }

    /// Cheap reachability check for health reporting.
    async fn health_check(&self) -> StorageResult<()>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}
