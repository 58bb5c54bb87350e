//! Background removal of blobs that never got linked to an owner.

use std::sync::Arc;
use std::time::{Duration, SystemTime};
use studio_core::AppError;
use studio_db::MediaStore;
use studio_storage::Storage;
use tokio::time::interval;

/// Outcome of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub orphans_removed: usize,
    pub incomplete_removed: usize,
}

pub struct OrphanSweeper {
    media: Arc<dyn MediaStore>,
    storage: Arc<dyn Storage>,
    interval: Duration,
    grace_period: Duration,
}

impl OrphanSweeper {
    pub fn new(
        media: Arc<dyn MediaStore>,
        storage: Arc<dyn Storage>,
        interval: Duration,
        grace_period: Duration,
    ) -> Self {
        Self {
            media,
            storage,
            interval,
            grace_period,
        }
    }

    /// Start the periodic sweep. Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.interval);

            loop {
                sweep_interval.tick().await;

                match self.sweep().await {
                    Ok(report) => tracing::info!(
                        scanned = report.scanned,
                        orphans_removed = report.orphans_removed,
                        incomplete_removed = report.incomplete_removed,
                        "Orphan sweep completed"
                    ),
                    Err(e) => tracing::error!(error = %e, "Orphan sweep failed"),
                }
            }
        })
    }

    /// Delete blobs older than the grace period that no media record points to, and
    /// leftovers of interrupted writes.
    ///
    /// Young blobs are skipped because an upload may sit between store and link.
    #[tracing::instrument(skip(self), fields(sweep.backend = self.storage.backend_name()))]
    pub async fn sweep(&self) -> Result<SweepReport, AppError> {
        let cutoff = SystemTime::now()
            .checked_sub(self.grace_period)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut report = SweepReport::default();

        let entries = self.storage.list().await?;
        report.scanned = entries.len();

        for entry in entries {
            if entry.modified > cutoff {
                continue;
            }
            let file_id = entry.key.file_id();
            match self.media.exists(file_id).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!(key = %entry.key, size_bytes = entry.size_bytes, "Removing orphaned blob");
                    match self.storage.delete(&entry.key).await {
                        Ok(()) => report.orphans_removed += 1,
                        Err(e) => {
                            tracing::error!(error = %e, key = %entry.key, "Failed to remove orphaned blob")
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, key = %entry.key, "Failed to check media record");
                }
            }
        }

        match self.storage.purge_incomplete(cutoff).await {
            Ok(count) => report.incomplete_removed = count,
            Err(e) => tracing::error!(error = %e, "Failed to purge incomplete uploads"),
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        jpeg_bytes, FailingMedia, InMemoryMedia, InMemoryUsers, MockStorage,
    };
    use studio_core::models::NewMediaLink;
    use studio_storage::BlobKey;
    use uuid::Uuid;

    const GRACE: Duration = Duration::from_secs(900);
    const OLD: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_sweep_removes_only_old_unlinked_blobs() {
        let users = Arc::new(InMemoryUsers::default());
        let owner = users.insert("alice@example.com");
        let media = Arc::new(InMemoryMedia::new(users));
        let storage = Arc::new(MockStorage::default());

        let linked = BlobKey::new(Uuid::new_v4(), Some("jpg"));
        storage.insert_aged(&linked, jpeg_bytes(4), OLD);
        media
            .link(&NewMediaLink {
                file_id: linked.file_id(),
                user_id: owner.id,
                extension: "jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                size_bytes: 8,
            })
            .await
            .unwrap();

        let orphan = BlobKey::new(Uuid::new_v4(), Some("png"));
        storage.insert_aged(&orphan, jpeg_bytes(4), OLD);

        let in_flight = BlobKey::new(Uuid::new_v4(), Some("jpg"));
        storage.insert_aged(&in_flight, jpeg_bytes(4), Duration::from_secs(5));

        let sweeper = OrphanSweeper::new(media, storage.clone(), OLD, GRACE);
        let report = sweeper.sweep().await.unwrap();

        assert_eq!(report.scanned, 3);
        assert_eq!(report.orphans_removed, 1);
        assert!(storage.exists(&linked).await.unwrap());
        assert!(!storage.exists(&orphan).await.unwrap());
        assert!(storage.exists(&in_flight).await.unwrap());
    }

    #[tokio::test]
    async fn test_sweep_keeps_blobs_when_database_unavailable() {
        let storage = Arc::new(MockStorage::default());
        let key = BlobKey::new(Uuid::new_v4(), Some("jpg"));
        storage.insert_aged(&key, jpeg_bytes(4), OLD);

        let sweeper = OrphanSweeper::new(Arc::new(FailingMedia), storage.clone(), OLD, GRACE);
        let report = sweeper.sweep().await.unwrap();

        assert_eq!(report.orphans_removed, 0);
        assert!(storage.exists(&key).await.unwrap());
    }
}
