//! Application state.
//!
//! Everything a handler touches is built once in `setup` and injected here. There are
//! no globals: the pool, blob store and id allocator reach services only through this
//! struct.

use std::sync::Arc;
use studio_core::Config;
use studio_db::InstrumentedPool;
use studio_storage::Storage;

use crate::services::{IngestionService, RetrievalService, UserService};

/// Database pool and the limits it was built with, for health reporting.
#[derive(Clone)]
pub struct DbState {
    pub pool: InstrumentedPool,
    pub max_connections: u32,
}

/// Upload and download services plus the blob store they share.
#[derive(Clone)]
pub struct MediaState {
    pub storage: Arc<dyn Storage>,
    pub ingestion: IngestionService,
    pub retrieval: RetrievalService,
    pub max_file_size_bytes: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DbState,
    pub media: MediaState,
    pub users: UserService,
}
