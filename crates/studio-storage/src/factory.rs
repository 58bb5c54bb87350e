use crate::{LocalStorage, Storage, StorageError, StorageResult};
use studio_core::Config;
use std::sync::Arc;

/// Create the blob store described by configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let root = config.upload_directory().trim();
    if root.is_empty() {
        return Err(StorageError::ConfigError(
            "UPLOAD_DIRECTORY not configured".to_string(),
        ));
    }

    let storage = LocalStorage::new(root)
        .await?
        .with_max_blob_bytes(config.max_file_size_bytes() as u64);

    tracing::info!(
        backend = storage.backend_name(),
        root = %storage.root().display(),
        "Blob storage ready"
    );

    Ok(Arc::new(storage))
}
