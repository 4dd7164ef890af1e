//! Scriptable film source

use async_trait::async_trait;
use holocron_api::swapi::{FilmDetail, FilmListing, FilmSource, FilmSummary, SourceError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What `list_films` answers
#[derive(Debug, Clone)]
pub enum Listing {
    /// A listing with these uids
    Films(Vec<String>),
    /// 2xx body without a `result` collection
    NoResult,
    /// 2xx body that is not the expected JSON
    Malformed,
    /// Connection failure
    Unreachable,
}

/// Film source driven entirely by the test
pub struct FakeFilmSource {
    listing: Mutex<Listing>,
    /// uid → detail; a missing uid fails with a 404
    details: Mutex<HashMap<String, FilmDetail>>,
    /// Delay inside `list_films`, to widen race windows
    listing_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    listing_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeFilmSource {
    pub fn new(listing: Listing) -> Self {
        Self {
            listing: Mutex::new(listing),
            details: Mutex::new(HashMap::new()),
            listing_delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            listing_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    /// Listing of `films` with every detail available
    pub fn with_films(films: Vec<(&str, FilmDetail)>) -> Self {
        let source = Self::new(Listing::Films(
            films.iter().map(|(uid, _)| uid.to_string()).collect(),
        ));
        for (uid, detail) in films {
            source.set_detail(uid, detail);
        }
        source
    }

    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = delay;
        self
    }

    pub fn set_detail(&self, uid: &str, detail: FilmDetail) {
        self.details.lock().unwrap().insert(uid.to_string(), detail);
    }

    pub fn set_listing(&self, listing: Listing) {
        *self.listing.lock().unwrap() = listing;
    }

    pub fn max_concurrent_listings(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FilmSource for FakeFilmSource {
    async fn list_films(&self) -> Result<FilmListing, SourceError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.listing_delay.is_zero() {
            tokio::time::sleep(self.listing_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let listing = self.listing.lock().unwrap().clone();
        match listing {
            Listing::Films(uids) => Ok(FilmListing {
                result: Some(
                    uids.into_iter()
                        .map(|uid| FilmSummary {
                            url: Some(format!("https://swapi.test/api/films/{uid}")),
                            uid,
                        })
                        .collect(),
                ),
            }),
            Listing::NoResult => Ok(FilmListing { result: None }),
            Listing::Malformed => Err(SourceError::MalformedBody("expected value".to_string())),
            Listing::Unreachable => Err(SourceError::Network("connection refused".to_string())),
        }
    }

    async fn get_film_detail(&self, uid: &str) -> Result<FilmDetail, SourceError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .lock()
            .unwrap()
            .get(uid)
            .cloned()
            .ok_or_else(|| SourceError::Status {
                status: 404,
                body: "not found".to_string(),
            })
    }
}

/// Complete film detail
pub fn film(title: &str, episode: i64) -> FilmDetail {
    FilmDetail {
        title: Some(title.to_string()),
        episode_id: Some(episode),
        opening_crawl: Some(format!("{title} opening crawl")),
        director: Some("George Lucas".to_string()),
        producer: Some("Rick McCallum".to_string()),
        release_date: Some("1999-05-19".to_string()),
        characters: Some(vec!["https://swapi.test/api/people/1".to_string()]),
        planets: Some(vec![]),
        starships: Some(vec![]),
        vehicles: Some(vec![]),
        species: Some(vec![]),
        url: None,
    }
}
