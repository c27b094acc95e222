use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::app::result::Failure;

/// Errors raised at the HTTP boundary. Use-case failures arrive as
/// `Failure` and are mapped to a status here.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Rate Limited: {0}")]
    RateLimited(String),
    #[error(transparent)]
    Failure(#[from] Failure),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::RateLimited(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, json!({ "error": msg }))
            }
            AppError::Failure(failure) => failure_response(failure),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn failure_response(failure: Failure) -> (StatusCode, serde_json::Value) {
    let message = failure.to_string();
    match failure {
        Failure::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": message, "errors": errors }),
        ),
        Failure::NoChanges => (StatusCode::BAD_REQUEST, json!({ "error": message })),
        Failure::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": message })),
        Failure::Conflict(_) => (StatusCode::CONFLICT, json!({ "error": message })),
        Failure::Unauthorized(_) => (StatusCode::UNAUTHORIZED, json!({ "error": message })),
        Failure::Forbidden(_) => (StatusCode::FORBIDDEN, json!({ "error": message })),
        Failure::Unexpected(detail) => {
            tracing::error!("Internal error: {detail}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            )
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Failure(err.into())
    }
}
