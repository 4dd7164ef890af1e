//! Star Wars API film source
//!
//! [`FilmSource`] abstracts the upstream catalog so the synchronizer can be
//! exercised against fakes. [`client::SwapiClient`] talks to swapi.tech.
//!
//! # Wire format
//! - Listing: `GET {base}/films` → `{ "result": [ { "uid": "1", ... } ] }`
//! - Detail: `GET {base}/films/{uid}` → `{ "result": { "uid": "1", "properties": { ... } } }`

pub mod client;

pub use client::SwapiClient;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Upstream fetch failures
#[derive(Debug, Error)]
pub enum SourceError {
    /// Request could not be sent or the body could not be read
    #[error("Film source request failed: {0}")]
    Network(String),

    /// Upstream answered with a non-success status
    #[error("Film source returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not the expected JSON shape
    #[error("Film source returned malformed data: {0}")]
    MalformedBody(String),
}

/// Film listing. `result` is `None` when the upstream omitted it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilmListing {
    #[serde(default)]
    pub result: Option<Vec<FilmSummary>>,
}

/// One listing entry; `uid` is the reference used to fetch the detail.
#[derive(Debug, Clone, Deserialize)]
pub struct FilmSummary {
    pub uid: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Film properties as published upstream. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilmDetail {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub episode_id: Option<i64>,
    #[serde(default)]
    pub opening_crawl: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub producer: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub characters: Option<Vec<String>>,
    #[serde(default)]
    pub planets: Option<Vec<String>>,
    #[serde(default)]
    pub starships: Option<Vec<String>>,
    #[serde(default)]
    pub vehicles: Option<Vec<String>>,
    #[serde(default)]
    pub species: Option<Vec<String>>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Read-only access to the upstream film catalog
#[async_trait]
pub trait FilmSource: Send + Sync {
    async fn list_films(&self) -> Result<FilmListing, SourceError>;

    /// Fetch one film by the `uid` from its listing entry.
    async fn get_film_detail(&self, uid: &str) -> Result<FilmDetail, SourceError>;
}
