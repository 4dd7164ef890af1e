//! User account persistence

use chrono::{DateTime, Utc};
use holocron_common::auth::UserRole;
use holocron_common::{Error, Result};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::{now, parse_timestamp, timestamp_text, unique_violation_as_conflict};

/// Stored account. The password hash never leaves the service.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new account (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Account lookups and inserts
#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.find_one("id", &id.to_string()).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_one("username", username).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one("email", email).await
    }

    // column is always one of the constant names above
    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| user_from_row(&row)).transpose()
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a new account.
    ///
    /// A username or email that is already taken yields [`Error::Conflict`].
    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let timestamp = now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: timestamp,
            updated_at: timestamp,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(timestamp_text(user.created_at))
        .bind(timestamp_text(user.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation_as_conflict(e, "Username or email already exists"))?;

        Ok(user)
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let id: String = row.try_get("id")?;
    let role: String = row.try_get("role")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(User {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(format!("Bad user id {id:?}: {e}")))?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse().map_err(Error::Internal)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Accounts created on first start so a fresh install can be administered
pub const DEFAULT_ACCOUNTS: [(&str, &str, &str, UserRole); 2] = [
    ("admin", "admin@starwars.com", "Admin123", UserRole::Admin),
    ("user", "user@starwars.com", "User123", UserRole::User),
];

/// Seed [`DEFAULT_ACCOUNTS`] when the users table is empty.
///
/// Returns the number of accounts created (0 if any account already exists).
pub async fn seed_default_users<F>(store: &UserStore, hash: F) -> Result<usize>
where
    F: Fn(&str) -> Result<String>,
{
    if store.count().await? > 0 {
        return Ok(0);
    }

    for (username, email, password, role) in DEFAULT_ACCOUNTS {
        store
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hash(password)?,
                role,
            })
            .await?;
        info!(username = %username, role = %role, "Seeded default account");
    }

    Ok(DEFAULT_ACCOUNTS.len())
}
