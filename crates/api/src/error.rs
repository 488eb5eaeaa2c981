//! API error types with HTTP response mapping.
//!
//! Every error renders as
//! `{ "success": false, "error": ..., "message": ..., "details"? }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ValidationErrors};
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed body, path or query.
    BadRequest(String),
    /// Missing or unusable credentials.
    Unauthorized(String),
    /// Authenticated, but the role is insufficient.
    Forbidden(String),
    /// Domain logic error.
    Domain(DomainError),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a ValidationErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, details) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad request", msg.clone(), None),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized", msg.clone(), None)
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg.clone(), None),
            ApiError::Domain(err) => domain_error_parts(err),
        };

        let body = ErrorBody {
            success: false,
            error,
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

fn domain_error_parts(
    err: &DomainError,
) -> (StatusCode, &'static str, String, Option<&ValidationErrors>) {
    match err {
        DomainError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            "Validation failed",
            err.to_string(),
            Some(errors),
        ),
        DomainError::SelfDeletion => (StatusCode::BAD_REQUEST, "Bad request", err.to_string(), None),
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "Not found", err.to_string(), None),
        DomainError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", err.to_string(), None),
        DomainError::InvalidCredentials | DomainError::Unauthorized(_) => {
            (StatusCode::UNAUTHORIZED, "Unauthorized", err.to_string(), None)
        }
        DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden", err.to_string(), None),
        DomainError::Storage(_)
        | DomainError::PasswordHash(_)
        | DomainError::Token(_)
        | DomainError::Task(_) => {
            tracing::error!(error = %err, "internal server error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "Internal server error".to_string(),
                None,
            )
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
