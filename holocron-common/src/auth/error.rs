//! Error types for authentication operations.

use thiserror::Error;

/// Authentication error types.
///
/// Every token-related variant means the caller is unauthenticated; the
/// password variants are internal failures, not wrong passwords.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// No Authorization header on the request.
    #[error("Token not found")]
    MissingToken,

    /// Header present but not `Bearer <token>`.
    #[error("Invalid authorization header format")]
    MalformedHeader,

    /// Token has expired (exp claim is in the past).
    #[error("Token has expired")]
    TokenExpired,

    /// Token signature is invalid.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token format is malformed or invalid.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Required claim is missing from token.
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Token could not be signed.
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    /// Password hashing operation failed.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored password hash is not a valid PHC string.
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

impl AuthError {
    /// True for every failure that should be reported as 401.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::MalformedHeader
                | AuthError::TokenExpired
                | AuthError::InvalidSignature
                | AuthError::InvalidToken(_)
                | AuthError::MissingClaim(_)
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.clone()),
            _ => AuthError::InvalidToken(err.to_string()),
        }
    }
}
