//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use studio_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .context("Failed to initialize telemetry")?;

    tracing::info!(environment = %config.environment(), "Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;

    let storage = studio_storage::create_storage(&config)
        .await
        .context("Failed to initialize blob storage")?;

    let state = services::initialize_services(&config, pool, storage);

    // Detached: the sweeper lives as long as the runtime.
    let _sweeper = services::start_orphan_sweeper(&config, &state);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
