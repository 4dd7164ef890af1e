//! swapi.tech HTTP client

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{FilmDetail, FilmListing, FilmSource, SourceError};

const USER_AGENT: &str = concat!("holocron/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct FilmDetailResponse {
    result: FilmDetailResult,
}

#[derive(Debug, Deserialize)]
struct FilmDetailResult {
    properties: FilmDetail,
}

/// Client for the swapi.tech films endpoints
#[derive(Debug, Clone)]
pub struct SwapiClient {
    http_client: Client,
    /// Base URL without trailing slash, e.g. `https://www.swapi.tech/api`
    base_url: String,
}

impl SwapiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        debug!(url = %url, "Querying film source");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))
    }
}

#[async_trait]
impl FilmSource for SwapiClient {
    async fn list_films(&self) -> Result<FilmListing, SourceError> {
        let body = self.get_text(&format!("{}/films", self.base_url)).await?;

        serde_json::from_str(&body).map_err(|e| SourceError::MalformedBody(e.to_string()))
    }

    async fn get_film_detail(&self, uid: &str) -> Result<FilmDetail, SourceError> {
        let body = self
            .get_text(&format!("{}/films/{}", self.base_url, uid))
            .await?;

        let detail: FilmDetailResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::MalformedBody(e.to_string()))?;

        Ok(detail.result.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = SwapiClient::new("http://localhost:1234/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/api");
    }

    #[test]
    fn test_detail_envelope_parses_properties() {
        let body = r#"{
            "message": "ok",
            "result": {
                "uid": "1",
                "properties": {
                    "title": "A New Hope",
                    "episode_id": 4,
                    "release_date": "1977-05-25",
                    "characters": ["https://www.swapi.tech/api/people/1"],
                    "created": "2025-01-01T00:00:00.000Z"
                }
            }
        }"#;

        let parsed: FilmDetailResponse = serde_json::from_str(body).unwrap();
        let detail = parsed.result.properties;
        assert_eq!(detail.title.as_deref(), Some("A New Hope"));
        assert_eq!(detail.episode_id, Some(4));
        assert_eq!(detail.characters.map(|c| c.len()), Some(1));
        assert!(detail.planets.is_none());
    }

    #[test]
    fn test_listing_without_result() {
        let listing: FilmListing = serde_json::from_str(r#"{"message": "ok"}"#).unwrap();
        assert!(listing.result.is_none());
    }
}
