//! Upload pipeline: size check, content sniffing, owner lookup, blob write, link.

use bytes::Bytes;
use std::io::Cursor;
use std::sync::Arc;
use studio_core::models::{MediaRecord, NewMediaLink};
use studio_core::{AppError, FileIdAllocator};
use studio_db::{MediaStore, UserStore};
use studio_processing::ContentValidator;
use studio_storage::{BlobKey, Storage};

use crate::auth::ActingUser;

/// An upload as received from the client, already bounded in size by the reader.
#[derive(Debug, Clone)]
pub struct IncomingMedia {
    pub data: Bytes,
    /// Client filename. Only its extension is used, for the stored blob name.
    pub filename: Option<String>,
    /// Part content type as declared by the client.
    pub content_type: Option<String>,
}

/// Coordinates validation, storage and association for one upload.
///
/// A blob is only ever left behind without an association when both the link and the
/// compensating delete fail, or the request is dropped between the two. The orphan
/// sweeper reclaims those.
#[derive(Clone)]
pub struct IngestionService {
    users: Arc<dyn UserStore>,
    media: Arc<dyn MediaStore>,
    storage: Arc<dyn Storage>,
    ids: Arc<dyn FileIdAllocator>,
    validator: ContentValidator,
    max_file_size_bytes: usize,
}

impl IngestionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        media: Arc<dyn MediaStore>,
        storage: Arc<dyn Storage>,
        ids: Arc<dyn FileIdAllocator>,
        max_file_size_bytes: usize,
    ) -> Self {
        Self {
            users,
            media,
            storage,
            ids,
            validator: ContentValidator::default(),
            max_file_size_bytes,
        }
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_bytes
    }

    #[tracing::instrument(
        skip(self, acting_user, upload),
        fields(
            acting_user = %acting_user.email(),
            size_bytes = upload.data.len(),
            file_id = tracing::field::Empty,
            owner_id = tracing::field::Empty,
            content_type = tracing::field::Empty,
        )
    )]
    pub async fn ingest(
        &self,
        acting_user: &ActingUser,
        upload: IncomingMedia,
    ) -> Result<MediaRecord, AppError> {
        let size_bytes = upload.data.len();
        if size_bytes > self.max_file_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds maximum size of {} bytes",
                self.max_file_size_bytes
            )));
        }
        tracing::debug!(state = "size_checked", "Upload received");

        let kind = self
            .validator
            .validate(&upload.data, upload.content_type.as_deref())?;
        let span = tracing::Span::current();
        span.record("content_type", kind.mime_type());
        tracing::debug!(state = "content_validated", "Upload content accepted");

        let owner = self
            .users
            .find_by_email(acting_user.email())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User {} not found", acting_user.email()))
            })?;
        span.record("owner_id", tracing::field::display(owner.id));

        let file_id = self.ids.allocate();
        span.record("file_id", tracing::field::display(file_id));
        let key = BlobKey::for_upload(
            file_id,
            upload.filename.as_deref(),
            kind.canonical_extension(),
        );

        let stored = self
            .storage
            .put(&key, Box::pin(Cursor::new(upload.data)))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "Failed to store upload");
                AppError::from(e)
            })?;
        tracing::info!(state = "stored", key = %key, "Upload stored");

        let link = NewMediaLink {
            file_id,
            user_id: owner.id,
            extension: key.extension().unwrap_or_default().to_string(),
            content_type: kind.mime_type().to_string(),
            size_bytes: stored.size_bytes as i64,
        };

        match self.media.link(&link).await {
            Ok(record) => {
                tracing::info!(state = "linked", "Upload linked to owner");
                Ok(record)
            }
            Err(link_err) => {
                tracing::error!(error = %link_err, key = %key, "Failed to link upload, removing blob");
                if let Err(delete_err) = self.storage.delete(&key).await {
                    tracing::error!(
                        error = %delete_err,
                        key = %key,
                        "Orphaned blob left behind, the orphan sweeper will reclaim it"
                    );
                }
                Err(link_err)
            }
        }
    }
}
