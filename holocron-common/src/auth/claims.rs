//! Token claims

use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::identity::CallerIdentity;
use super::role::UserRole;

/// Claims written into every access token.
///
/// - `sub`: user id
/// - `username`, `email`: display data
/// - `role`: authorization role
/// - `iat` / `exp`: Unix timestamps (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// Claims as they arrive from an untrusted token.
///
/// Every claim is optional here so a token that verifies cryptographically
/// but lacks `sub` or `role` is reported as a missing claim rather than a
/// generic decode failure.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UntrustedClaims {
    pub sub: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub iat: Option<i64>,
    pub exp: i64,
}

impl TryFrom<UntrustedClaims> for TokenClaims {
    type Error = AuthError;

    fn try_from(raw: UntrustedClaims) -> Result<Self, Self::Error> {
        let sub = raw
            .sub
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::MissingClaim("sub".to_string()))?;
        let role = raw
            .role
            .ok_or_else(|| AuthError::MissingClaim("role".to_string()))?
            .parse::<UserRole>()
            .map_err(AuthError::InvalidToken)?;

        Ok(TokenClaims {
            sub,
            username: raw.username.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            role,
            iat: raw.iat.unwrap_or_default(),
            exp: raw.exp,
        })
    }
}

impl From<TokenClaims> for CallerIdentity {
    fn from(claims: TokenClaims) -> Self {
        CallerIdentity {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
            username: (!claims.username.is_empty()).then_some(claims.username),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(sub: Option<&str>, role: Option<&str>) -> UntrustedClaims {
        UntrustedClaims {
            sub: sub.map(String::from),
            username: Some("luke".to_string()),
            email: Some("luke@example.com".to_string()),
            role: role.map(String::from),
            iat: Some(1),
            exp: 2,
        }
    }

    #[test]
    fn test_complete_claims_convert() {
        let claims = TokenClaims::try_from(raw(Some("abc"), Some("admin"))).unwrap();
        assert_eq!(claims.sub, "abc");
        assert_eq!(claims.role, UserRole::Admin);

        let identity = CallerIdentity::from(claims);
        assert_eq!(identity.id, "abc");
        assert_eq!(identity.email, "luke@example.com");
        assert_eq!(identity.username.as_deref(), Some("luke"));
    }

    #[test]
    fn test_missing_subject_is_rejected() {
        let err = TokenClaims::try_from(raw(None, Some("user"))).unwrap_err();
        assert!(matches!(err, AuthError::MissingClaim(ref c) if c == "sub"));

        let err = TokenClaims::try_from(raw(Some(""), Some("user"))).unwrap_err();
        assert!(matches!(err, AuthError::MissingClaim(_)));
    }

    #[test]
    fn test_missing_or_unknown_role_is_rejected() {
        let err = TokenClaims::try_from(raw(Some("abc"), None)).unwrap_err();
        assert!(matches!(err, AuthError::MissingClaim(ref c) if c == "role"));

        let err = TokenClaims::try_from(raw(Some("abc"), Some("jedi"))).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }
}
