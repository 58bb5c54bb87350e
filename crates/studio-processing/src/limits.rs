use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::validator::ValidationError;

/// Read an upload into memory, never pulling more than `max + 1` bytes from `reader`.
///
/// Exactly `max` bytes is accepted. Anything longer fails with
/// [`ValidationError::FileTooLarge`] after reading one byte past the limit.
pub async fn read_capped<R>(reader: R, max: usize) -> Result<Bytes, ValidationError>
where
    R: AsyncRead + Unpin,
{
    let limit = (max as u64).saturating_add(1);
    let mut buf = Vec::with_capacity(max.min(64 * 1024));
    reader.take(limit).read_to_end(&mut buf).await?;

    if buf.len() > max {
        tracing::debug!(max_bytes = max, "Upload exceeded size limit");
        return Err(ValidationError::FileTooLarge { max });
    }

    Ok(Bytes::from(buf))
}
