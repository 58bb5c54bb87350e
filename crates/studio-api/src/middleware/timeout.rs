//! Per-request deadline.
//!
//! When the deadline passes the handler future is dropped. An upload dropped inside
//! `Storage::put` leaves no blob; one dropped between the blob write and the link leaves
//! an unreferenced blob for the orphan sweeper.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use studio_core::AppError;

use crate::error::HttpAppError;

#[derive(Clone, Copy, Debug)]
pub struct RequestDeadline(pub Duration);

pub async fn timeout_middleware(
    State(deadline): State<RequestDeadline>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match tokio::time::timeout(deadline.0, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(
                method = %method,
                path = %path,
                timeout_secs = deadline.0.as_secs(),
                "Request exceeded deadline"
            );
            HttpAppError(AppError::Timeout(format!(
                "Request did not complete within {} seconds",
                deadline.0.as_secs()
            )))
            .into_response()
        }
    }
}
