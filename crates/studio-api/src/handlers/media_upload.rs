use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use studio_core::models::UploadResponse;

use crate::auth::ActingUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// Upload a JPEG or PNG file
///
/// The file is attributed to the caller named in `X-User-Email` (or the configured
/// default). Content is classified from its leading bytes; the filename and declared
/// content type cannot make a file acceptable.
#[utoipa::path(
    post,
    path = "/postMedia",
    tag = "media",
    params(
        ("X-User-Email" = Option<String>, Header, description = "Email of the uploading user")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored and linked", body = UploadResponse),
        (status = 400, description = "Missing or repeated file field, missing caller, or file too large (PAYLOAD_TOO_LARGE)", body = ErrorResponse),
        (status = 404, description = "Uploading user not registered", body = ErrorResponse),
        (status = 415, description = "Not a JPEG or PNG", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, acting_user, multipart),
    fields(acting_user = %acting_user.email(), operation = "post_media")
)]
pub async fn post_media(
    State(state): State<Arc<AppState>>,
    acting_user: ActingUser,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let upload = extract_multipart_file(multipart, state.media.max_file_size_bytes).await?;
    let record = state.media.ingestion.ingest(&acting_user, upload).await?;

    Ok(Json(UploadResponse {
        file_id: record.file_id,
    }))
}
