//! Error types for holocron-api
//!
//! Every failure reaches the client as `{"error": {"code", "message"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use holocron_common::auth::{AccessDenied, AuthError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::sync::SyncError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Duplicate username, email or swapi_id (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream film source failed (502)
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// holocron-common error
    #[error("Common error: {0}")]
    Common(#[from] holocron_common::Error),
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated(msg) => ApiError::Unauthorized(msg),
            AccessDenied::Forbidden(msg) => ApiError::Forbidden(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_unauthenticated() {
            ApiError::Unauthorized(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        ApiError::BadGateway(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use holocron_common::Error as CommonError;

        let (status, error_code, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "SOURCE_UNAVAILABLE", msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
            ApiError::Common(CommonError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Common(CommonError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg)
            }
            ApiError::Common(CommonError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Common(ref err) => {
                error!(error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::BadGateway("x".into()), StatusCode::BAD_GATEWAY),
            (
                ApiError::Common(holocron_common::Error::Conflict("x".into())),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Common(holocron_common::Error::InvalidInput("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Common(holocron_common::Error::Internal("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_access_denied_conversion() {
        let err: ApiError = AccessDenied::Forbidden("Insufficient permissions".into()).into();
        assert!(matches!(err, ApiError::Forbidden(ref m) if m == "Insufficient permissions"));
    }
}
