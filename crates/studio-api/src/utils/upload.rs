//! Multipart handling for media uploads

use axum::extract::Multipart;
use futures::TryStreamExt;
use studio_core::AppError;
use studio_processing::read_capped;
use tokio_util::io::StreamReader;

use crate::services::IncomingMedia;

/// Name of the form field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Extract the `file` part of a multipart form, reading at most `max_bytes + 1` bytes of it.
///
/// Other fields are drained and ignored. A missing or repeated `file` field is a 400; a
/// part longer than `max_bytes` is `PayloadTooLarge` and the rest of the body is not read.
pub async fn extract_multipart_file(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<IncomingMedia, AppError> {
    let mut upload: Option<IncomingMedia> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if upload.is_some() {
            return Err(AppError::BadRequest(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        let reader = StreamReader::new(field.map_err(std::io::Error::other));
        let data = read_capped(reader, max_bytes).await?;

        upload = Some(IncomingMedia {
            data,
            filename,
            content_type,
        });
    }

    upload.ok_or_else(|| {
        AppError::BadRequest(format!(
            "No file provided; send the upload in a multipart field named '{}'",
            FILE_FIELD
        ))
    })
}
