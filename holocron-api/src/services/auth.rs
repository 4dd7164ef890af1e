//! Account registration and login

use holocron_common::auth::{PasswordHasher, TokenIssuer, TokenSubject, UserRole};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::users::{seed_default_users, NewUser, User, UserStore};
use crate::error::{ApiError, ApiResult};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Validated signup input
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Issued token plus the account it was issued for
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    hasher: PasswordHasher,
    issuer: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(users: UserStore, hasher: PasswordHasher, issuer: Arc<TokenIssuer>) -> Self {
        Self {
            users,
            hasher,
            issuer,
        }
    }

    /// Register an account and sign a token for it.
    pub async fn signup(&self, account: NewAccount) -> ApiResult<AuthSession> {
        if self.users.find_by_username(&account.username).await?.is_some() {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }
        if self.users.find_by_email(&account.email).await?.is_some() {
            return Err(ApiError::Conflict("Email already exists".to_string()));
        }

        let password_hash = self.hash(account.password).await?;
        let user = self
            .users
            .create(NewUser {
                username: account.username,
                email: account.email,
                password_hash,
                role: account.role,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "Registered account");
        self.session_for(user)
    }

    /// Check a username/password pair and sign a token.
    ///
    /// Unknown username and wrong password are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthSession> {
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!(username = %username, "Login for unknown account");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !self.verify(password.to_string(), user.password_hash.clone()).await? {
            warn!(username = %username, "Login with wrong password");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        info!(user_id = %user.id, "Login succeeded");
        self.session_for(user)
    }

    /// Create the default admin and user accounts on an empty database.
    pub async fn seed_default_accounts(&self) -> ApiResult<usize> {
        let hasher = self.hasher.clone();
        let seeded = seed_default_users(&self.users, |password| {
            hasher
                .hash(password)
                .map_err(|e| holocron_common::Error::Internal(e.to_string()))
        })
        .await?;
        Ok(seeded)
    }

    fn session_for(&self, user: User) -> ApiResult<AuthSession> {
        let access_token = self.issuer.issue(&TokenSubject {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        })?;

        Ok(AuthSession { access_token, user })
    }

    // Argon2 is CPU-bound; keep it off the async workers
    async fn hash(&self, password: String) -> ApiResult<String> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ApiError::Internal(format!("Hashing task failed: {e}")))??;
        Ok(hash)
    }

    async fn verify(&self, password: String, hash: String) -> ApiResult<bool> {
        let hasher = self.hasher.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| ApiError::Internal(format!("Verification task failed: {e}")))??;
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;
    use holocron_common::auth::TokenVerifier;

    const SECRET: &str = "auth-service-test";

    async fn service() -> AuthService {
        let pool = init_memory_pool().await.unwrap();
        AuthService::new(
            UserStore::new(pool),
            PasswordHasher::with_params(1024, 1, 1).unwrap(),
            Arc::new(TokenIssuer::new(SECRET, 3600)),
        )
    }

    fn account(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_signup_issues_verifiable_token() {
        let service = service().await;
        let session = service.signup(account("rey", "rey@jakku.net")).await.unwrap();

        let claims = TokenVerifier::new(SECRET).decode(&session.access_token).unwrap();
        assert_eq!(claims.sub, session.user.id.to_string());
        assert_eq!(claims.role, UserRole::User);
        assert_ne!(session.user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_signup_conflicts() {
        let service = service().await;
        service.signup(account("finn", "finn@order.net")).await.unwrap();

        let err = service.signup(account("finn", "other@order.net")).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m == "Username already exists"));

        let err = service.signup(account("fn2187", "finn@order.net")).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m == "Email already exists"));
    }

    #[tokio::test]
    async fn test_login() {
        let service = service().await;
        service.signup(account("poe", "poe@resistance.org")).await.unwrap();

        let session = service.login("poe", "password123").await.unwrap();
        assert_eq!(session.user.username, "poe");

        let wrong = service.login("poe", "password124").await.unwrap_err();
        let unknown = service.login("bb8", "password123").await.unwrap_err();
        for err in [wrong, unknown] {
            assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid credentials"));
        }
    }

    #[tokio::test]
    async fn test_seeded_accounts_can_log_in() {
        let service = service().await;
        assert_eq!(service.seed_default_accounts().await.unwrap(), 2);

        let admin = service.login("admin", "Admin123").await.unwrap();
        assert_eq!(admin.user.role, UserRole::Admin);
        assert!(service.login("user", "User123").await.is_ok());
    }
}
