//! Blob naming shared by storage backends.

use std::fmt;
use std::path::Path;
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 10;

/// Identifies one stored blob: the file id plus the extension recorded at upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey {
    file_id: Uuid,
    extension: Option<String>,
}

impl BlobKey {
    /// Build a key from a file id and an extension that may come from a client.
    ///
    /// Unusable extensions (empty, too long, non-alphanumeric) are dropped.
    pub fn new(file_id: Uuid, extension: Option<&str>) -> Self {
        Self {
            file_id,
            extension: extension.and_then(sanitize_extension),
        }
    }

    /// Key for a new upload, taking the extension from the client's filename and
    /// falling back to `fallback_extension` when it has none.
    ///
    /// The filename extension is kept even if it disagrees with the content.
    pub fn for_upload(
        file_id: Uuid,
        original_filename: Option<&str>,
        fallback_extension: &str,
    ) -> Self {
        let from_name = original_filename
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .and_then(sanitize_extension);

        Self {
            file_id,
            extension: from_name.or_else(|| sanitize_extension(fallback_extension)),
        }
    }

    /// Parse a stored blob name back into a key. Returns `None` for anything that
    /// is not `{uuid}` or `{uuid}.{ext}`.
    pub fn parse(name: &str) -> Option<Self> {
        let (stem, extension) = match name.split_once('.') {
            Some((stem, ext)) => (stem, Some(ext)),
            None => (name, None),
        };
        let file_id = Uuid::parse_str(stem).ok()?;
        match extension {
            Some(ext) => {
                let sanitized = sanitize_extension(ext)?;
                (sanitized == ext).then(|| Self {
                    file_id,
                    extension: Some(sanitized),
                })
            }
            None => Some(Self {
                file_id,
                extension: None,
            }),
        }
    }

    pub fn file_id(&self) -> Uuid {
        self.file_id
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Flat filename of the blob.
    pub fn filename(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", self.file_id, ext),
            None => self.file_id.to_string(),
        }
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename())
    }
}

fn sanitize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext)
}
