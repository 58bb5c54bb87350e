use axum::{extract::State, Json};
use std::sync::Arc;
use studio_core::models::User;
use studio_core::validation::{EmailRequest, NewUserRequest};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Register a user
#[utoipa::path(
    post,
    path = "/newUser",
    tag = "users",
    request_body = NewUserRequest,
    responses(
        (status = 200, description = "User registered", body = User),
        (status = 400, description = "Malformed body, invalid fields (INVALID_INPUT) or email already registered (CONFLICT)", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "new_user"))]
pub async fn new_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<NewUserRequest>,
) -> Result<Json<User>, HttpAppError> {
    let user = state.users.register(request).await?;
    Ok(Json(user))
}

/// Look up a user by email
#[utoipa::path(
    get,
    path = "/getUser",
    tag = "users",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "No user with this email", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "get_user"))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<EmailRequest>,
) -> Result<Json<User>, HttpAppError> {
    let user = state.users.get(&request).await?;
    Ok(Json(user))
}
