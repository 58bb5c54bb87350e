use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use std::sync::Arc;
use studio_core::validation::DownloadRequest;
use studio_core::AppError;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Download a file by id
#[utoipa::path(
    get,
    path = "/downloadMedia",
    tag = "media",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "No linked file with this id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "download_media", file_id = %request.video_id))]
pub async fn download_media(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<DownloadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let download = state.media.retrieval.open_download(&request).await?;

    tracing::debug!(filename = %download.filename, size_bytes = download.size_bytes, "Streaming file");

    let body_stream = download.stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, download.size_bytes)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.filename),
        )
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
