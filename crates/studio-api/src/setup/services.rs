//! Service wiring.
//!
//! Repositories, blob store and id allocator are built here and handed to the services
//! as trait objects.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use studio_core::{Config, FileIdAllocator, RandomFileIds};
use studio_db::{InstrumentedPool, MediaRepository, MediaStore, UserRepository, UserStore};
use studio_storage::Storage;
use tokio::task::JoinHandle;

use crate::services::{IngestionService, OrphanSweeper, RetrievalService, UserService};
use crate::state::{AppState, DbState, MediaState};

pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Arc<AppState> {
    let pool = InstrumentedPool::new(pool);
    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool.clone()));
    let media: Arc<dyn MediaStore> = Arc::new(MediaRepository::new(pool.clone()));
    let ids: Arc<dyn FileIdAllocator> = Arc::new(RandomFileIds);

    let ingestion = IngestionService::new(
        users.clone(),
        media.clone(),
        storage.clone(),
        ids,
        config.max_file_size_bytes(),
    );
    let retrieval = RetrievalService::new(media, storage.clone());

    Arc::new(AppState {
        config: config.clone(),
        db: DbState {
            pool,
            max_connections: config.db_max_connections(),
        },
        media: MediaState {
            storage,
            ingestion,
            retrieval,
            max_file_size_bytes: config.max_file_size_bytes(),
        },
        users: UserService::new(users),
    })
}

/// Start the periodic orphan sweep. Returns `None` when the interval is 0.
pub fn start_orphan_sweeper(config: &Config, state: &AppState) -> Option<JoinHandle<()>> {
    let interval_secs = config.orphan_sweep_interval_secs();
    if interval_secs == 0 {
        tracing::info!("Orphan sweeper disabled");
        return None;
    }

    let media: Arc<dyn MediaStore> = Arc::new(MediaRepository::new(state.db.pool.clone()));
    let sweeper = Arc::new(OrphanSweeper::new(
        media,
        state.media.storage.clone(),
        Duration::from_secs(interval_secs),
        Duration::from_secs(config.orphan_grace_period_secs()),
    ));

    tracing::info!(
        interval_secs,
        grace_period_secs = config.orphan_grace_period_secs(),
        "Orphan sweeper started"
    );
    Some(sweeper.start())
}
