//! Request shapes and their validation rules
//!
//! Each request body has its own struct with declared rules. Handlers call
//! [`ValidateRequest::check`] after deserializing, so a request that reaches a
//! service has already passed every field rule.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;
use crate::models::NewUser;

/// Typed validation for an incoming request body.
pub trait ValidateRequest {
    fn check(&self) -> Result<(), AppError>;
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Turns validator output into an `InvalidInput` naming every failing field.
fn to_app_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{}: {}", field, reasons.join(", "))
        })
        .collect();
    fields.sort();
    AppError::InvalidInput(format!("Missing or invalid fields: {}", fields.join("; ")))
}

/// Body of `POST /newUser`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 254)
    )]
    pub email: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub last_name: String,
}

impl ValidateRequest for NewUserRequest {
    fn check(&self) -> Result<(), AppError> {
        self.validate().map_err(to_app_error)
    }
}

impl From<NewUserRequest> for NewUser {
    fn from(req: NewUserRequest) -> Self {
        NewUser {
            email: req.email,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
        }
    }
}

/// Body of `GET /getUser` and `GET /files`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct EmailRequest {
    #[validate(length(min = 1, max = 254), custom(function = "not_blank"))]
    pub email: String,
}

impl ValidateRequest for EmailRequest {
    fn check(&self) -> Result<(), AppError> {
        self.validate().map_err(to_app_error)
    }
}

/// Body of `GET /downloadMedia`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub video_id: Uuid,
}

impl ValidateRequest for DownloadRequest {
    fn check(&self) -> Result<(), AppError> {
        if self.video_id.is_nil() {
            return Err(AppError::InvalidInput(
                "Missing or invalid fields: videoId: must not be the nil UUID".to_string(),
            ));
        }
        Ok(())
    }
}
