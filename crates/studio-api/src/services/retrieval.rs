//! Listing and downloading media.
//!
//! Every lookup goes through the association store first, so a blob without a media
//! record is never reachable here.

use std::sync::Arc;
use studio_core::validation::{DownloadRequest, EmailRequest, ValidateRequest};
use studio_core::AppError;
use studio_db::MediaStore;
use studio_storage::{BlobDownload, BlobKey, Storage, StorageError};
use uuid::Uuid;

#[derive(Clone)]
pub struct RetrievalService {
    media: Arc<dyn MediaStore>,
    storage: Arc<dyn Storage>,
}

impl RetrievalService {
    pub fn new(media: Arc<dyn MediaStore>, storage: Arc<dyn Storage>) -> Self {
        Self { media, storage }
    }

    /// File ids owned by the user, oldest first. Unknown users own nothing.
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn list_files(&self, request: &EmailRequest) -> Result<Vec<Uuid>, AppError> {
        request.check()?;
        let ids = self.media.list_for_email(&request.email).await?;
        tracing::debug!(count = ids.len(), "Listed files");
        Ok(ids)
    }

    /// Open the blob behind a linked file id.
    #[tracing::instrument(skip(self, request), fields(file_id = %request.video_id))]
    pub async fn open_download(&self, request: &DownloadRequest) -> Result<BlobDownload, AppError> {
        request.check()?;
        let file_id = request.video_id;

        let record = self
            .media
            .find(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))?;

        let extension = Some(record.extension.as_str()).filter(|e| !e.is_empty());
        let key = BlobKey::new(record.file_id, extension);

        match self.storage.get(&key).await {
            Ok(download) => Ok(download),
            Err(StorageError::NotFound(_)) => {
                tracing::warn!(key = %key, "Media record has no blob");
                Err(AppError::NotFound(format!("File {} not found", file_id)))
            }
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Failed to open blob");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{jpeg_bytes, InMemoryMedia, InMemoryUsers, MockStorage};
    use futures::StreamExt;
    use std::time::Duration;
    use studio_core::models::NewMediaLink;

    struct Fixture {
        users: Arc<InMemoryUsers>,
        media: Arc<InMemoryMedia>,
        storage: Arc<MockStorage>,
        service: RetrievalService,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUsers::default());
        let media = Arc::new(InMemoryMedia::new(users.clone()));
        let storage = Arc::new(MockStorage::default());
        let service = RetrievalService::new(media.clone(), storage.clone());
        Fixture {
            users,
            media,
            storage,
            service,
        }
    }

    fn email(value: &str) -> EmailRequest {
        EmailRequest {
            email: value.to_string(),
        }
    }

    async fn link(fx: &Fixture, owner: Uuid, data: Vec<u8>, ext: &str) -> Uuid {
        let file_id = Uuid::new_v4();
        let key = BlobKey::new(file_id, Some(ext));
        fx.storage.insert_aged(&key, data.clone(), Duration::ZERO);
        fx.media
            .link(&NewMediaLink {
                file_id,
                user_id: owner,
                extension: ext.to_string(),
                content_type: "image/jpeg".to_string(),
                size_bytes: data.len() as i64,
            })
            .await
            .unwrap();
        file_id
    }

    #[tokio::test]
    async fn test_listing_is_isolated_per_user() {
        let fx = fixture();
        let alice = fx.users.insert("alice@example.com");
        let bob = fx.users.insert("bob@example.com");

        let a1 = link(&fx, alice.id, jpeg_bytes(1), "jpg").await;
        let a2 = link(&fx, alice.id, jpeg_bytes(2), "jpg").await;
        let b1 = link(&fx, bob.id, jpeg_bytes(3), "jpg").await;

        let alice_files = fx.service.list_files(&email("alice@example.com")).await.unwrap();
        assert_eq!(alice_files, vec![a1, a2]);
        assert!(!alice_files.contains(&b1));

        let bob_files = fx.service.list_files(&email("bob@example.com")).await.unwrap();
        assert_eq!(bob_files, vec![b1]);
    }

    #[tokio::test]
    async fn test_unknown_user_lists_nothing() {
        let fx = fixture();
        let files = fx.service.list_files(&email("ghost@example.com")).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_download_returns_stored_bytes() {
        let fx = fixture();
        let alice = fx.users.insert("alice@example.com");
        let data = jpeg_bytes(300);
        let file_id = link(&fx, alice.id, data.clone(), "jpeg").await;

        let download = fx
            .service
            .open_download(&DownloadRequest { video_id: file_id })
            .await
            .unwrap();
        assert_eq!(download.filename, format!("{}.jpeg", file_id));

        let mut body = Vec::new();
        let mut stream = download.stream;
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, data);
    }

    #[tokio::test]
    async fn test_unlinked_blob_is_not_downloadable() {
        let fx = fixture();
        let file_id = Uuid::new_v4();
        fx.storage
            .insert_aged(&BlobKey::new(file_id, Some("jpg")), jpeg_bytes(5), Duration::ZERO);

        let err = fx
            .service
            .open_download(&DownloadRequest { video_id: file_id })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let fx = fixture();
        let alice = fx.users.insert("alice@example.com");
        let file_id = link(&fx, alice.id, jpeg_bytes(5), "jpg").await;
        fx.storage
            .delete(&BlobKey::new(file_id, Some("jpg")))
            .await
            .unwrap();

        let err = fx
            .service
            .open_download(&DownloadRequest { video_id: file_id })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
