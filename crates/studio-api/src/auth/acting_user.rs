use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::sync::Arc;
use studio_core::AppError;

use crate::constants::ACTING_USER_HEADER;
use crate::error::HttpAppError;
use crate::state::AppState;

/// The user an upload is attributed to.
///
/// Taken from the `X-User-Email` header, falling back to the configured
/// `DEFAULT_ACTING_USER`. Requests with neither are rejected with 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    email: String,
}

impl ActingUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    fn resolve(header: Option<&str>, fallback: Option<&str>) -> Result<Self, AppError> {
        header
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| fallback.map(str::trim).filter(|s| !s.is_empty()))
            .map(ActingUser::new)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Missing caller identity: send the {} header",
                    ACTING_USER_HEADER
                ))
            })
    }
}

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = Arc::<AppState>::from_ref(state);
        let header = parts
            .headers
            .get(ACTING_USER_HEADER)
            .map(|value| {
                value.to_str().map_err(|_| {
                    AppError::BadRequest(format!("{} must be valid ASCII", ACTING_USER_HEADER))
                })
            })
            .transpose()?;

        Ok(Self::resolve(header, state.config.default_acting_user())?)
    }
}
