//! Movie catalog persistence
//!
//! The [`MovieStore`] trait is the seam between the HTTP handlers / film
//! synchronizer and storage. [`SqliteMovieStore`] is the production
//! implementation; tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use holocron_common::pagination::Pagination;
use holocron_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{now, parse_timestamp, timestamp_text, unique_violation_as_conflict};

/// Wire and storage format of `release_date`
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub episode_id: Option<i64>,
    pub opening_crawl: String,
    pub director: String,
    pub producer: String,
    pub release_date: NaiveDate,
    pub characters: Vec<String>,
    pub planets: Vec<String>,
    pub starships: Vec<String>,
    pub vehicles: Vec<String>,
    pub species: Vec<String>,
    /// Source URL of the upstream record
    #[serde(rename = "url")]
    pub source_url: Option<String>,
    /// Upstream identifier; unique across the catalog when present
    #[serde(rename = "swapi_id")]
    pub external_id: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Every caller-controlled field of a movie
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFields {
    pub title: String,
    pub episode_id: Option<i64>,
    pub opening_crawl: String,
    pub director: String,
    pub producer: String,
    pub release_date: NaiveDate,
    pub characters: Vec<String>,
    pub planets: Vec<String>,
    pub starships: Vec<String>,
    pub vehicles: Vec<String>,
    pub species: Vec<String>,
    pub source_url: Option<String>,
    pub external_id: Option<String>,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub episode_id: Option<i64>,
    pub opening_crawl: Option<String>,
    pub director: Option<String>,
    pub producer: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub characters: Option<Vec<String>>,
    pub planets: Option<Vec<String>>,
    pub starships: Option<Vec<String>>,
    pub vehicles: Option<Vec<String>>,
    pub species: Option<Vec<String>>,
}

impl MoviePatch {
    /// Copy every supplied field onto `movie`. Identity, upstream linkage
    /// and timestamps are never touched.
    pub fn apply_to(self, movie: &mut Movie) {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut movie.title, self.title);
        if self.episode_id.is_some() {
            movie.episode_id = self.episode_id;
        }
        set(&mut movie.opening_crawl, self.opening_crawl);
        set(&mut movie.director, self.director);
        set(&mut movie.producer, self.producer);
        set(&mut movie.release_date, self.release_date);
        set(&mut movie.characters, self.characters);
        set(&mut movie.planets, self.planets);
        set(&mut movie.starships, self.starships);
        set(&mut movie.vehicles, self.vehicles);
        set(&mut movie.species, self.species);
    }
}

/// Catalog storage operations
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Insert a new movie with a fresh id.
    async fn create(&self, fields: MovieFields) -> Result<Movie>;

    /// One page of movies ordered by episode ascending, then newest first,
    /// together with the total row count.
    async fn find_all(&self, pagination: Pagination) -> Result<(Vec<Movie>, i64)>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Movie>>;

    /// Persist every field of `movie` and refresh `updated_at`.
    async fn update(&self, movie: &Movie) -> Result<Movie>;

    async fn remove(&self, movie: &Movie) -> Result<()>;

    /// Upsert keyed by `external_id`: overwrite the existing row's fields
    /// (keeping its `id` and `created_at`) or insert a new one.
    async fn create_or_update(&self, fields: MovieFields) -> Result<Movie>;
}

/// SQLite-backed [`MovieStore`]
#[derive(Debug, Clone)]
pub struct SqliteMovieStore {
    pool: SqlitePool,
}

impl SqliteMovieStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const MOVIE_COLUMNS: &str = "id, title, episode_id, opening_crawl, director, producer, \
    release_date, characters, planets, starships, vehicles, species, url, external_id, \
    created_at, updated_at";

const DUPLICATE_EXTERNAL_ID: &str = "A movie with this swapi_id already exists";

#[async_trait]
impl MovieStore for SqliteMovieStore {
    async fn create(&self, fields: MovieFields) -> Result<Movie> {
        let timestamp = now();
        let movie = Movie::from_fields(Uuid::new_v4(), fields, timestamp);

        sqlx::query(
            r#"
            INSERT INTO movies (
                id, title, episode_id, opening_crawl, director, producer, release_date,
                characters, planets, starships, vehicles, species, url, external_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(movie.id.to_string())
        .bind(&movie.title)
        .bind(movie.episode_id)
        .bind(&movie.opening_crawl)
        .bind(&movie.director)
        .bind(&movie.producer)
        .bind(movie.release_date.format(RELEASE_DATE_FORMAT).to_string())
        .bind(list_text(&movie.characters)?)
        .bind(list_text(&movie.planets)?)
        .bind(list_text(&movie.starships)?)
        .bind(list_text(&movie.vehicles)?)
        .bind(list_text(&movie.species)?)
        .bind(&movie.source_url)
        .bind(&movie.external_id)
        .bind(timestamp_text(movie.created_at))
        .bind(timestamp_text(movie.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation_as_conflict(e, DUPLICATE_EXTERNAL_ID))?;

        Ok(movie)
    }

    async fn find_all(&self, pagination: Pagination) -> Result<(Vec<Movie>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;

        // Movies without an episode number sort after numbered ones
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             ORDER BY episode_id IS NULL, episode_id ASC, created_at DESC \
             LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(pagination.limit)
            .bind(pagination.offset)
            .fetch_all(&self.pool)
            .await?;

        let movies = rows.iter().map(movie_from_row).collect::<Result<Vec<_>>>()?;
        Ok((movies, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(movie_from_row).transpose()
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Movie>> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE external_id = ?");
        let row = sqlx::query(&sql)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(movie_from_row).transpose()
    }

    async fn update(&self, movie: &Movie) -> Result<Movie> {
        let mut updated = movie.clone();
        updated.updated_at = now();

        let result = sqlx::query(
            r#"
            UPDATE movies SET
                title = ?, episode_id = ?, opening_crawl = ?, director = ?, producer = ?,
                release_date = ?, characters = ?, planets = ?, starships = ?, vehicles = ?,
                species = ?, url = ?, external_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&updated.title)
        .bind(updated.episode_id)
        .bind(&updated.opening_crawl)
        .bind(&updated.director)
        .bind(&updated.producer)
        .bind(updated.release_date.format(RELEASE_DATE_FORMAT).to_string())
        .bind(list_text(&updated.characters)?)
        .bind(list_text(&updated.planets)?)
        .bind(list_text(&updated.starships)?)
        .bind(list_text(&updated.vehicles)?)
        .bind(list_text(&updated.species)?)
        .bind(&updated.source_url)
        .bind(&updated.external_id)
        .bind(timestamp_text(updated.updated_at))
        .bind(updated.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation_as_conflict(e, DUPLICATE_EXTERNAL_ID))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Movie with ID {} not found", movie.id)));
        }

        Ok(updated)
    }

    async fn remove(&self, movie: &Movie) -> Result<()> {
        sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(movie.id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_or_update(&self, fields: MovieFields) -> Result<Movie> {
        let Some(external_id) = fields.external_id.clone() else {
            return self.create(fields).await;
        };

        let timestamp = now();
        let candidate = Movie::from_fields(Uuid::new_v4(), fields, timestamp);

        sqlx::query(
            r#"
            INSERT INTO movies (
                id, title, episode_id, opening_crawl, director, producer, release_date,
                characters, planets, starships, vehicles, species, url, external_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(external_id) DO UPDATE SET
                title = excluded.title,
                episode_id = excluded.episode_id,
                opening_crawl = excluded.opening_crawl,
                director = excluded.director,
                producer = excluded.producer,
                release_date = excluded.release_date,
                characters = excluded.characters,
                planets = excluded.planets,
                starships = excluded.starships,
                vehicles = excluded.vehicles,
                species = excluded.species,
                url = excluded.url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(candidate.id.to_string())
        .bind(&candidate.title)
        .bind(candidate.episode_id)
        .bind(&candidate.opening_crawl)
        .bind(&candidate.director)
        .bind(&candidate.producer)
        .bind(candidate.release_date.format(RELEASE_DATE_FORMAT).to_string())
        .bind(list_text(&candidate.characters)?)
        .bind(list_text(&candidate.planets)?)
        .bind(list_text(&candidate.starships)?)
        .bind(list_text(&candidate.vehicles)?)
        .bind(list_text(&candidate.species)?)
        .bind(&candidate.source_url)
        .bind(&external_id)
        .bind(timestamp_text(candidate.created_at))
        .bind(timestamp_text(candidate.updated_at))
        .execute(&self.pool)
        .await?;

        self.find_by_external_id(&external_id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Upserted movie {external_id} vanished")))
    }
}

impl Movie {
    pub(crate) fn from_fields(id: Uuid, fields: MovieFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: fields.title,
            episode_id: fields.episode_id,
            opening_crawl: fields.opening_crawl,
            director: fields.director,
            producer: fields.producer,
            release_date: fields.release_date,
            characters: fields.characters,
            planets: fields.planets,
            starships: fields.starships,
            vehicles: fields.vehicles,
            species: fields.species,
            source_url: fields.source_url,
            external_id: fields.external_id,
            created_at: now,
            updated_at: now,
        }
    }
}

fn list_text(values: &[String]) -> Result<String> {
    serde_json::to_string(values).map_err(|e| Error::Internal(format!("Encode list: {e}")))
}

fn list_from_text(row: &SqliteRow, column: &str) -> Result<Vec<String>> {
    let text: String = row.try_get(column)?;
    serde_json::from_str(&text)
        .map_err(|e| Error::Internal(format!("Bad {column} list {text:?}: {e}")))
}

fn movie_from_row(row: &SqliteRow) -> Result<Movie> {
    let id: String = row.try_get("id")?;
    let release_date: String = row.try_get("release_date")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Movie {
        id: Uuid::parse_str(&id)
            .map_err(|e| Error::Internal(format!("Bad movie id {id:?}: {e}")))?,
        title: row.try_get("title")?,
        episode_id: row.try_get("episode_id")?,
        opening_crawl: row.try_get("opening_crawl")?,
        director: row.try_get("director")?,
        producer: row.try_get("producer")?,
        release_date: NaiveDate::parse_from_str(&release_date, RELEASE_DATE_FORMAT)
            .map_err(|e| Error::Internal(format!("Bad release date {release_date:?}: {e}")))?,
        characters: list_from_text(row, "characters")?,
        planets: list_from_text(row, "planets")?,
        starships: list_from_text(row, "starships")?,
        vehicles: list_from_text(row, "vehicles")?,
        species: list_from_text(row, "species")?,
        source_url: row.try_get("url")?,
        external_id: row.try_get("external_id")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
