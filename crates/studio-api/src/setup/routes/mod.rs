//! Route configuration and setup.
//!
//! Health checks live in [health](health).

pub mod health;

pub use health::HealthResponse;

use crate::api_doc::ApiDoc;
use crate::constants::MULTIPART_OVERHEAD_BYTES;
use crate::handlers;
use crate::middleware::{request_id_middleware, timeout::RequestDeadline, timeout_middleware};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use studio_core::Config;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = config.http_concurrency_limit().max(1);
    let request_timeout_secs = config.request_timeout_secs().max(1);
    let body_limit = config
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    tracing::info!(
        http_concurrency_limit,
        request_timeout_secs,
        body_limit,
        "HTTP limits configured"
    );

    let app = api_routes()
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            RequestDeadline(Duration::from_secs(request_timeout_secs)),
            timeout_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/openapi.json", get(openapi_json))
        .route("/newUser", post(handlers::users::new_user))
        .route("/getUser", get(handlers::users::get_user))
        .route("/files", get(handlers::files::list_files))
        .route("/postMedia", post(handlers::media_upload::post_media))
        .route(
            "/downloadMedia",
            get(handlers::media_download::download_media),
        )
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
