//! OpenAPI documentation, served at `/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use studio_core::{models, validation};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Studio API",
        version = "0.1.0",
        description = "Media ingestion service: register users, upload JPEG and PNG files, list and download them."
    ),
    paths(
        // Users
        handlers::users::new_user,
        handlers::users::get_user,
        // Media
        handlers::media_upload::post_media,
        handlers::files::list_files,
        handlers::media_download::download_media,
        // Health
        health::health_check,
    ),
    components(
        schemas(
            models::User,
            models::UploadResponse,
            validation::NewUserRequest,
            validation::EmailRequest,
            validation::DownloadRequest,
            health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "users", description = "User registration and lookup"),
        (name = "media", description = "Upload, listing and download of image files"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
