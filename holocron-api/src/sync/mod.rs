//! Film synchronization
//!
//! Pulls the upstream film listing, fetches each film's detail and upserts
//! it into the catalog keyed by its upstream `uid`. A failing item is logged
//! and skipped; only an unusable listing aborts the run.
//!
//! Runs are serialized: a manual trigger that arrives while the scheduled
//! run is in progress waits for it to finish.

pub mod scheduler;

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::db::movies::{MovieFields, MovieStore, RELEASE_DATE_FORMAT};
use crate::swapi::{FilmDetail, FilmSource, FilmSummary, SourceError};

/// Release date recorded when the upstream omits one
pub const FALLBACK_RELEASE_DATE: &str = "1977-01-01";

/// Run-level failures. Item failures never surface here.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Listing unreachable or shaped so that no film can be enumerated
    #[error("Star Wars API unavailable: {0}")]
    SourceUnavailable(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Films in the listing
    pub attempted: usize,
    /// Films written to the catalog
    pub synchronized: usize,
    pub message: String,
}

impl SyncOutcome {
    fn new(attempted: usize, synchronized: usize) -> Self {
        Self {
            attempted,
            synchronized,
            message: format!(
                "Successfully synchronized {} movies from Star Wars API",
                synchronized
            ),
        }
    }
}

/// Why one film was not written
#[derive(Debug, Error)]
enum ItemError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unparseable release_date {0:?}")]
    InvalidReleaseDate(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] holocron_common::Error),
}

/// Reconciles the catalog with the upstream film source
pub struct FilmSynchronizer {
    source: Arc<dyn FilmSource>,
    store: Arc<dyn MovieStore>,
    run_lock: Mutex<()>,
}

impl FilmSynchronizer {
    pub fn new(source: Arc<dyn FilmSource>, store: Arc<dyn MovieStore>) -> Self {
        Self {
            source,
            store,
            run_lock: Mutex::new(()),
        }
    }

    /// Run one synchronization pass.
    pub async fn run(&self) -> Result<SyncOutcome, SyncError> {
        let _running = self.run_lock.lock().await;
        info!("Starting Star Wars movies synchronization");

        let listing = match self.source.list_films().await {
            Ok(listing) => listing,
            Err(SourceError::MalformedBody(reason)) => {
                error!(reason = %reason, "Film listing is malformed");
                return Err(SyncError::SourceUnavailable(reason));
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch film listing");
                return Err(e.into());
            }
        };

        let Some(films) = listing.result else {
            error!("Film listing has no result collection");
            return Err(SyncError::SourceUnavailable(
                "Invalid response from Star Wars API".to_string(),
            ));
        };

        let mut synchronized = 0;
        for summary in &films {
            match self.sync_film(summary).await {
                Ok(title) => {
                    synchronized += 1;
                    info!(uid = %summary.uid, title = %title, "Synchronized film");
                }
                Err(ItemError::MissingField(field)) => {
                    warn!(uid = %summary.uid, field, "Missing required data for film, skipping");
                }
                Err(e) => {
                    error!(uid = %summary.uid, error = %e, "Failed to synchronize film");
                }
            }
        }

        let outcome = SyncOutcome::new(films.len(), synchronized);
        info!(
            attempted = outcome.attempted,
            synchronized = outcome.synchronized,
            "Synchronization completed"
        );
        Ok(outcome)
    }

    async fn sync_film(&self, summary: &FilmSummary) -> Result<String, ItemError> {
        let detail = self.source.get_film_detail(&summary.uid).await?;
        let fields = normalize_film(detail, &summary.uid)?;
        let title = fields.title.clone();

        self.store.create_or_update(fields).await?;
        Ok(title)
    }
}

/// Turn upstream properties into catalog fields.
///
/// `title` and `episode_id` are required; every other field falls back to
/// an empty value, and `release_date` to [`FALLBACK_RELEASE_DATE`].
fn normalize_film(detail: FilmDetail, uid: &str) -> Result<MovieFields, ItemError> {
    let title = detail
        .title
        .filter(|t| !t.is_empty())
        .ok_or(ItemError::MissingField("title"))?;
    let episode_id = detail.episode_id.ok_or(ItemError::MissingField("episode_id"))?;

    let release_date = match detail.release_date.as_deref().map(str::trim) {
        None | Some("") => parse_release_date(FALLBACK_RELEASE_DATE),
        Some(raw) => parse_release_date(raw),
    }?;

    Ok(MovieFields {
        title,
        episode_id: Some(episode_id),
        opening_crawl: detail.opening_crawl.unwrap_or_default(),
        director: detail.director.unwrap_or_default(),
        producer: detail.producer.unwrap_or_default(),
        release_date,
        characters: detail.characters.unwrap_or_default(),
        planets: detail.planets.unwrap_or_default(),
        starships: detail.starships.unwrap_or_default(),
        vehicles: detail.vehicles.unwrap_or_default(),
        species: detail.species.unwrap_or_default(),
        source_url: Some(detail.url.unwrap_or_default()),
        external_id: Some(uid.to_string()),
    })
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn parse_release_date(raw: &str) -> Result<NaiveDate, ItemError> {
    NaiveDate::parse_from_str(raw, RELEASE_DATE_FORMAT)
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ItemError::InvalidReleaseDate(raw.to_string()))
}
