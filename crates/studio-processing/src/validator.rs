use studio_core::AppError;

/// Number of leading bytes inspected when classifying an upload.
pub const SNIFF_LEN: usize = 512;

/// Media kinds accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Jpeg,
    Png,
}

impl MediaKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaKind::Jpeg => "image/jpeg",
            MediaKind::Png => "image/png",
        }
    }

    /// Extension used when the client filename has none.
    pub fn canonical_extension(&self) -> &'static str {
        match self {
            MediaKind::Jpeg => "jpg",
            MediaKind::Png => "png",
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(MediaKind::Jpeg),
            "image/png" => Some(MediaKind::Png),
            _ => None,
        }
    }
}

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: exceeds {max} bytes")]
    FileTooLarge { max: usize },

    #[error("Unsupported content type: {detected}")]
    UnsupportedContentType { detected: String },

    #[error("Declared content type {declared} does not match detected {detected}")]
    ContentTypeMismatch { declared: String, detected: String },

    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyFile => {
                AppError::UnsupportedMediaType("Uploaded file is empty".to_string())
            }
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::UnsupportedContentType { .. }
            | ValidationError::ContentTypeMismatch { .. } => {
                AppError::UnsupportedMediaType(err.to_string())
            }
            ValidationError::Io(e) => AppError::BadRequest(format!("Failed to read upload: {}", e)),
        }
    }
}

/// Magic-byte classifier for uploads.
///
/// Only the first [`SNIFF_LEN`] bytes are looked at. The client's filename and form
/// field name never take part in the decision; a declared content type only can
/// reject, never accept.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    allowed: Vec<MediaKind>,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new(vec![MediaKind::Jpeg, MediaKind::Png])
    }
}

impl ContentValidator {
    pub fn new(allowed: Vec<MediaKind>) -> Self {
        Self { allowed }
    }

    /// Classify the leading bytes of an upload.
    ///
    /// Inputs shorter than [`SNIFF_LEN`] are classified from what is there.
    pub fn sniff(&self, data: &[u8]) -> Result<MediaKind, ValidationError> {
        if data.is_empty() {
            return Err(ValidationError::EmptyFile);
        }

        let head = &data[..data.len().min(SNIFF_LEN)];
        let detected = infer::get(head)
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream");

        match MediaKind::from_mime(detected) {
            Some(kind) if self.allowed.contains(&kind) => Ok(kind),
            _ => Err(ValidationError::UnsupportedContentType {
                detected: detected.to_string(),
            }),
        }
    }

    /// Reject a declared part content type that names a different media kind.
    ///
    /// Absent and generic declarations (`application/octet-stream`) are ignored.
    pub fn check_declared(
        &self,
        declared: Option<&str>,
        detected: MediaKind,
    ) -> Result<(), ValidationError> {
        let Some(declared) = declared.map(normalize_mime_type) else {
            return Ok(());
        };
        if declared.is_empty() || declared == "application/octet-stream" {
            return Ok(());
        }

        match MediaKind::from_mime(&declared) {
            Some(kind) if kind == detected => Ok(()),
            _ => Err(ValidationError::ContentTypeMismatch {
                declared,
                detected: detected.mime_type().to_string(),
            }),
        }
    }

    /// Sniff and cross-check against the declared content type.
    pub fn validate(
        &self,
        data: &[u8],
        declared: Option<&str>,
    ) -> Result<MediaKind, ValidationError> {
        let kind = self.sniff(data)?;
        self.check_declared(declared, kind)?;
        Ok(kind)
    }
}

fn normalize_mime_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
