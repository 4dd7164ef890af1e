//! Bearer token issuing and verification (HS256).
//!
//! The verifier is the only place a raw `Authorization` header value is
//! interpreted. It is stateless: the outcome depends on the shared secret
//! and the current time alone.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;

use super::claims::{TokenClaims, UntrustedClaims};
use super::error::AuthError;
use super::identity::CallerIdentity;
use super::role::UserRole;

/// Scheme prefix expected in the `Authorization` header
pub const BEARER_SCHEME: &str = "Bearer";

/// Default token lifetime (one day)
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 86_400;

/// Extract the token segment from an `Authorization` header value.
///
/// The value must be exactly `"Bearer " + token`: one space, a non-empty
/// token, nothing after it.
///
/// ```
/// use holocron_common::auth::extract_bearer_token;
///
/// assert_eq!(extract_bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
/// assert!(extract_bearer_token(Some("Bearer  abc")).is_err());
/// assert!(extract_bearer_token(Some("abc")).is_err());
/// assert!(extract_bearer_token(None).is_err());
/// ```
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;

    let mut segments = header.split(' ');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Anything able to turn a raw header value into a caller identity.
///
/// Implemented by [`TokenVerifier`]; the seam lets the access decision code
/// be exercised with verifiers that count or refuse calls.
pub trait CredentialVerifier {
    fn verify(&self, header: Option<&str>) -> Result<CallerIdentity, AuthError>;
}

/// Account data needed to mint a token
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

/// Signs access tokens with the shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::seconds(lifetime_secs),
        }
    }

    /// Issue a token valid from now for the configured lifetime.
    pub fn issue(&self, subject: &TokenSubject) -> Result<String, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if signed at `issued_at`.
    pub fn issue_at(
        &self,
        subject: &TokenSubject,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: subject.id.clone(),
            username: subject.username.clone(),
            email: subject.email.clone(),
            role: subject.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::EncodingFailed(e.to_string()))
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime_secs", &self.lifetime.num_seconds())
            .finish_non_exhaustive()
    }
}

/// Credential verifier backed by the shared HS256 secret
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256];
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a bare token and return its claims.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let data = decode::<UntrustedClaims>(token, &self.key, &self.validation)?;
        TokenClaims::try_from(data.claims)
    }
}

impl CredentialVerifier for TokenVerifier {
    fn verify(&self, header: Option<&str>) -> Result<CallerIdentity, AuthError> {
        let token = extract_bearer_token(header)?;
        let claims = self.decode(token)?;
        Ok(CallerIdentity::from(claims))
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn subject(role: UserRole) -> TokenSubject {
        TokenSubject {
            id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            role,
        }
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn test_extract_bearer_token_valid() {
        assert_eq!(extract_bearer_token(Some("Bearer my.test.token")).unwrap(), "my.test.token");
    }

    #[test]
    fn test_extract_bearer_token_rejects_malformed_headers() {
        assert_eq!(extract_bearer_token(None), Err(AuthError::MissingToken));
        assert_eq!(extract_bearer_token(Some("invalid.format")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer_token(Some("Bearer ")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer_token(Some("Bearer")), Err(AuthError::MalformedHeader));
        assert_eq!(
            extract_bearer_token(Some("Bearer  token.with.spaces")),
            Err(AuthError::MalformedHeader)
        );
        assert_eq!(extract_bearer_token(Some("Basic abc")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer_token(Some("bearer abc")), Err(AuthError::MalformedHeader));
    }

    #[test]
    fn test_issue_then_verify() {
        let issuer = TokenIssuer::new(SECRET, DEFAULT_TOKEN_LIFETIME_SECS);
        let verifier = TokenVerifier::new(SECRET);

        let token = issuer.issue(&subject(UserRole::Admin)).unwrap();
        let identity = verifier.verify(Some(&bearer(&token))).unwrap();

        assert_eq!(identity.id, "123e4567-e89b-12d3-a456-426614174000");
        assert_eq!(identity.email, "test@example.com");
        assert_eq!(identity.role, UserRole::Admin);
        assert_eq!(identity.username.as_deref(), Some("testuser"));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let issuer = TokenIssuer::new("another-secret", DEFAULT_TOKEN_LIFETIME_SECS);
        let verifier = TokenVerifier::new(SECRET);

        let token = issuer.issue(&subject(UserRole::User)).unwrap();
        let err = verifier.verify(Some(&bearer(&token))).unwrap_err();
        assert_eq!(err, AuthError::InvalidSignature);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = TokenIssuer::new(SECRET, 60);
        let verifier = TokenVerifier::new(SECRET);

        let token = issuer
            .issue_at(&subject(UserRole::User), Utc::now() - Duration::hours(2))
            .unwrap();
        let err = verifier.verify(Some(&bearer(&token))).unwrap_err();
        assert_eq!(err, AuthError::TokenExpired);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let verifier = TokenVerifier::new(SECRET);
        let err = verifier.verify(Some("Bearer not.a.jwt")).unwrap_err();
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn test_token_without_role_claim_is_rejected() {
        #[derive(serde::Serialize)]
        struct Partial {
            sub: String,
            exp: i64,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &Partial {
                sub: "abc".to_string(),
                exp: (Utc::now() + Duration::hours(1)).timestamp(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = TokenVerifier::new(SECRET).verify(Some(&bearer(&token))).unwrap_err();
        assert_eq!(err, AuthError::MissingClaim("role".to_string()));
    }
}
