use axum::{extract::State, Json};
use std::sync::Arc;
use studio_core::validation::EmailRequest;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// List the file ids a user owns, oldest first
#[utoipa::path(
    get,
    path = "/files",
    tag = "media",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "File ids, possibly empty", body = Vec<Uuid>),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "list_files"))]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<EmailRequest>,
) -> Result<Json<Vec<Uuid>>, HttpAppError> {
    let ids = state.media.retrieval.list_files(&request).await?;
    Ok(Json(ids))
}
