use async_trait::async_trait;
use sqlx::Postgres;
use studio_core::models::{MediaRecord, NewMediaLink};
use studio_core::AppError;

use crate::pool::InstrumentedPool;
use uuid::Uuid;

/// Associations between stored blobs and their owners.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Record that `link.file_id` belongs to `link.user_id`.
    ///
    /// Fails with a database error when the owner does not exist or the file id is
    /// already linked.
    async fn link(&self, link: &NewMediaLink) -> Result<MediaRecord, AppError>;

    /// File ids owned by the user with this email, oldest first. Unknown emails own
    /// nothing.
    async fn list_for_email(&self, email: &str) -> Result<Vec<Uuid>, AppError>;

    async fn find(&self, file_id: Uuid) -> Result<Option<MediaRecord>, AppError>;

    async fn exists(&self, file_id: Uuid) -> Result<bool, AppError>;
}

/// Repository for the `media` table
#[derive(Clone)]
pub struct MediaRepository {
    pool: InstrumentedPool,
}

impl MediaRepository {
    pub fn new(pool: InstrumentedPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaStore for MediaRepository {
    #[tracing::instrument(skip(self, link), fields(db.table = "media", db.operation = "insert", file_id = %link.file_id, owner_id = %link.user_id))]
    async fn link(&self, link: &NewMediaLink) -> Result<MediaRecord, AppError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query_as::<Postgres, MediaRecord>(
            r#"
            INSERT INTO media (file_id, user_id, extension, content_type, size_bytes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING file_id, user_id, extension, content_type, size_bytes, created_at
            "#,
        )
        .bind(link.file_id)
        .bind(link.user_id)
        .bind(&link.extension)
        .bind(&link.content_type)
        .bind(link.size_bytes)
        .fetch_one(&mut *conn)
        .await;

        result.map_err(|e| {
            let err = AppError::from(e);
            if err.is_foreign_key_violation() {
                tracing::warn!("Owner vanished before media could be linked");
            } else if err.is_unique_violation() {
                tracing::warn!("File id already linked");
            }
            err
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn list_for_email(&self, email: &str) -> Result<Vec<Uuid>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let ids = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            SELECT m.file_id
            FROM media m
            JOIN users u ON u.id = m.user_id
            WHERE u.email = $1
            ORDER BY m.created_at ASC, m.file_id ASC
            "#,
        )
        .bind(email)
        .fetch_all(&mut *conn)
        .await?;

        Ok(ids)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %file_id))]
    async fn find(&self, file_id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let record = sqlx::query_as::<Postgres, MediaRecord>(
            r#"
            SELECT file_id, user_id, extension, content_type, size_bytes, created_at
            FROM media
            WHERE file_id = $1
            "#,
        )
        .bind(file_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %file_id))]
    async fn exists(&self, file_id: Uuid) -> Result<bool, AppError> {
        let mut conn = self.pool.acquire().await?;
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM media WHERE file_id = $1)",
        )
        .bind(file_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }
}
