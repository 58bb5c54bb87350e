//! Health check handler and response type.

use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;
use crate::state::{AppState, DbState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

/// Percentage of the pool in use above which load is reported as heavy.
const HEAVY_LOAD_PERCENT: u32 = 80;

/// Wait events above which the pool is reported as a bottleneck.
const HIGH_WAIT_COUNT: u64 = 1000;

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "up" or "down"
    pub status: String,
    pub message: String,
    pub database: String,
    pub storage: String,
    pub open_connections: u32,
    pub idle: u32,
    pub in_use: u32,
    pub max_connections: u32,
    /// Acquisitions that found every connection busy
    pub wait_count: u64,
    /// Total time spent in those acquisitions
    pub wait_duration_ms: u64,
}

/// Connection counts and wait statistics sampled from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PoolUsage {
    open: u32,
    idle: u32,
    max: u32,
    wait_count: u64,
    wait_duration_ms: u64,
}

impl PoolUsage {
    fn sample(db: &DbState) -> Self {
        let open = db.pool.size();
        let idle = db.pool.num_idle().min(open);
        let waits = db.pool.wait_stats();
        Self {
            open,
            idle,
            max: db.max_connections,
            wait_count: waits.wait_count,
            wait_duration_ms: u64::try_from(waits.wait_duration.as_millis())
                .unwrap_or(u64::MAX),
        }
    }

    fn in_use(&self) -> u32 {
        self.open.saturating_sub(self.idle)
    }

    fn message(&self) -> String {
        let in_use = self.in_use();
        if self.max > 0 && in_use >= self.max {
            format!(
                "The connection pool is saturated: all {} connections are in use.",
                self.max
            )
        } else if self.wait_count > HIGH_WAIT_COUNT {
            "The database has a high number of wait events, indicating potential bottlenecks."
                .to_string()
        } else if u64::from(in_use) * 100 > u64::from(self.max) * u64::from(HEAVY_LOAD_PERCENT) {
            "The database is experiencing heavy load.".to_string()
        } else {
            "It's healthy".to_string()
        }
    }
}

/// Database and blob store status with connection pool statistics.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);

    let pool = state.db.pool.clone();
    let database = run_check(
        timeout,
        async move {
            let mut conn = pool.acquire().await?;
            sqlx::query("SELECT 1").execute(&mut *conn).await.map(drop)
        },
        "unhealthy",
    )
    .await;
    let database_up = database == "healthy";

    let storage = state.media.storage.clone();
    let storage_status = run_check(
        timeout,
        async move { storage.health_check().await },
        "degraded",
    )
    .await;

    let usage = PoolUsage::sample(&state.db);

    let (status_code, status, message) = if database_up {
        (StatusCode::OK, "up", usage.message())
    } else {
        tracing::error!(database = %database, "Health check failed: database down");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "down",
            format!("db down: {}", database),
        )
    };

    if storage_status != "healthy" {
        tracing::warn!(storage = %storage_status, "Health check: blob storage degraded");
    }

    let response = HealthResponse {
        status: status.to_string(),
        message,
        database,
        storage: storage_status,
        open_connections: usage.open,
        idle: usage.idle,
        in_use: usage.in_use(),
        max_connections: usage.max,
        wait_count: usage.wait_count,
        wait_duration_ms: usage.wait_duration_ms,
    };

    (status_code, Json(response))
}
