use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Association between an uploaded blob and the user who owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub file_id: Uuid,
    pub user_id: Uuid,
    /// Extension of the stored blob, without the dot. Empty when the blob has none.
    pub extension: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Name of the blob in storage and the filename suggested on download.
    pub fn stored_filename(&self) -> String {
        if self.extension.is_empty() {
            self.file_id.to_string()
        } else {
            format!("{}.{}", self.file_id, self.extension)
        }
    }
}

/// Values written when an ingested blob is linked to its owner.
#[derive(Debug, Clone)]
pub struct NewMediaLink {
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub extension: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// Response for a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: Uuid,
}
