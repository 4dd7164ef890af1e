//! Authentication and authorization building blocks
//!
//! - [`token`]: HS256 bearer token issuing and the credential verifier
//! - [`access`]: per-route requirements and the access decision engine
//! - [`password`]: Argon2id password hashing
//!
//! # Design Principle
//!
//! Pure functions and plain types only. The service crate applies these
//! through axum middleware; nothing here knows about requests or routers.

pub mod access;
pub mod claims;
pub mod error;
pub mod identity;
pub mod password;
pub mod role;
pub mod token;

pub use access::{authorize, decide, AccessDenied, RouteRequirement};
pub use claims::TokenClaims;
pub use error::AuthError;
pub use identity::CallerIdentity;
pub use password::PasswordHasher;
pub use role::UserRole;
pub use token::{extract_bearer_token, CredentialVerifier, TokenIssuer, TokenSubject, TokenVerifier};
