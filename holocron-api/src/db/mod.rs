//! Database access for holocron-api
//!
//! SQLite persistence for accounts and the movie catalog.

pub mod movies;
pub mod users;

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Creates the database file (and its parent directory) on first start.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied
///
/// One connection keeps every query on the same in-memory database.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the users and movies tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // String lists are stored as JSON arrays
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            episode_id INTEGER,
            opening_crawl TEXT NOT NULL DEFAULT '',
            director TEXT NOT NULL DEFAULT '',
            producer TEXT NOT NULL DEFAULT '',
            release_date TEXT NOT NULL,
            characters TEXT NOT NULL DEFAULT '[]',
            planets TEXT NOT NULL DEFAULT '[]',
            starships TEXT NOT NULL DEFAULT '[]',
            vehicles TEXT NOT NULL DEFAULT '[]',
            species TEXT NOT NULL DEFAULT '[]',
            url TEXT,
            external_id TEXT UNIQUE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_movies_episode ON movies(episode_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database tables initialized (users, movies)");

    Ok(())
}

/// Current time at the precision timestamps are stored with
pub(crate) fn now() -> chrono::DateTime<chrono::Utc> {
    use chrono::SubsecRound;
    chrono::Utc::now().trunc_subsecs(6)
}

/// Fixed-width UTC timestamp so TEXT ordering matches time ordering
pub(crate) fn timestamp_text(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(
    value: &str,
) -> holocron_common::Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| holocron_common::Error::Internal(format!("Bad timestamp {value:?}: {e}")))
}

/// Map a UNIQUE constraint violation to a conflict, anything else to a database error.
pub(crate) fn unique_violation_as_conflict(
    err: sqlx::Error,
    message: &str,
) -> holocron_common::Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            holocron_common::Error::Conflict(message.to_string())
        }
        _ => holocron_common::Error::Database(err),
    }
}
