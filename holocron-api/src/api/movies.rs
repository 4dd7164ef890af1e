//! /movies endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use holocron_common::pagination::{PageQuery, Paginated};
use holocron_common::response::ApiResponse;
use serde::Deserialize;

use super::validation::{
    check_not_empty, check_release_date, parse_release_date, Validate, ValidJson,
};
use crate::db::movies::{Movie, MovieFields, MoviePatch};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /movies request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMovieRequest {
    pub title: String,
    #[serde(default)]
    pub episode_id: Option<i64>,
    pub opening_crawl: String,
    pub director: String,
    pub producer: String,
    pub release_date: String,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub planets: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
}

impl Validate for CreateMovieRequest {
    fn violations(&self) -> Vec<String> {
        let mut v = Vec::new();
        check_not_empty(&mut v, "title", &self.title);
        check_not_empty(&mut v, "opening_crawl", &self.opening_crawl);
        check_not_empty(&mut v, "director", &self.director);
        check_not_empty(&mut v, "producer", &self.producer);
        check_release_date(&mut v, "release_date", &self.release_date);
        v
    }
}

impl CreateMovieRequest {
    fn into_fields(self) -> ApiResult<MovieFields> {
        Ok(MovieFields {
            release_date: release_date(&self.release_date)?,
            title: self.title,
            episode_id: self.episode_id,
            opening_crawl: self.opening_crawl,
            director: self.director,
            producer: self.producer,
            characters: self.characters,
            planets: self.planets,
            starships: self.starships,
            vehicles: self.vehicles,
            species: self.species,
            source_url: None,
            external_id: None,
        })
    }
}

/// PATCH /movies/:id request. Any subset of the create fields.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub episode_id: Option<i64>,
    pub opening_crawl: Option<String>,
    pub director: Option<String>,
    pub producer: Option<String>,
    pub release_date: Option<String>,
    pub characters: Option<Vec<String>>,
    pub planets: Option<Vec<String>>,
    pub starships: Option<Vec<String>>,
    pub vehicles: Option<Vec<String>>,
    pub species: Option<Vec<String>>,
}

impl Validate for UpdateMovieRequest {
    fn violations(&self) -> Vec<String> {
        let mut v = Vec::new();
        let text_fields = [
            ("title", &self.title),
            ("opening_crawl", &self.opening_crawl),
            ("director", &self.director),
            ("producer", &self.producer),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                check_not_empty(&mut v, field, value);
            }
        }
        if let Some(date) = &self.release_date {
            check_release_date(&mut v, "release_date", date);
        }
        v
    }
}

impl UpdateMovieRequest {
    fn into_patch(self) -> ApiResult<MoviePatch> {
        Ok(MoviePatch {
            release_date: self.release_date.as_deref().map(release_date).transpose()?,
            title: self.title,
            episode_id: self.episode_id,
            opening_crawl: self.opening_crawl,
            director: self.director,
            producer: self.producer,
            characters: self.characters,
            planets: self.planets,
            starships: self.starships,
            vehicles: self.vehicles,
            species: self.species,
        })
    }
}

fn release_date(value: &str) -> ApiResult<chrono::NaiveDate> {
    parse_release_date(value)
        .ok_or_else(|| ApiError::BadRequest("release_date must be a valid YYYY-MM-DD date".to_string()))
}

/// GET /movies?page=&limit=
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<Movie>>> {
    Ok(Json(state.movies.find_all(query).await?))
}

/// GET /movies/:id
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Movie>>> {
    let movie = state.movies.find_one(&id).await?;
    Ok(Json(ApiResponse::new("Movie retrieved successfully", movie)))
}

/// POST /movies
pub async fn create_movie(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateMovieRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Movie>>)> {
    let movie = state.movies.create(request.into_fields()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Movie created successfully", movie)),
    ))
}

/// PATCH /movies/:id
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<UpdateMovieRequest>,
) -> ApiResult<Json<ApiResponse<Movie>>> {
    let movie = state.movies.update(&id, request.into_patch()?).await?;
    Ok(Json(ApiResponse::new("Movie updated successfully", movie)))
}

/// DELETE /movies/:id
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Movie>>> {
    let movie = state.movies.remove(&id).await?;
    Ok(Json(ApiResponse::new("Movie deleted successfully", movie)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_rejects_unknown_fields() {
        let body = r#"{"title":"x","opening_crawl":"x","director":"x","producer":"x",
            "release_date":"1977-05-25","swapi_id":"1"}"#;
        assert!(serde_json::from_str::<CreateMovieRequest>(body).is_err());
    }

    #[test]
    fn test_create_request_rules() {
        let body = r#"{"title":"","opening_crawl":"x","director":"x","producer":"x",
            "release_date":"May 25 1977"}"#;
        let request: CreateMovieRequest = serde_json::from_str(body).unwrap();

        let violations = request.violations();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].starts_with("title"));
        assert!(violations[1].starts_with("release_date"));
    }

    #[test]
    fn test_empty_patch_is_valid() {
        let request: UpdateMovieRequest = serde_json::from_str("{}").unwrap();
        assert!(request.violations().is_empty());
        assert_eq!(request.into_patch().unwrap(), MoviePatch::default());
    }

    #[test]
    fn test_patch_checks_supplied_fields_only() {
        let request = UpdateMovieRequest {
            director: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(request.violations(), vec!["director should not be empty".to_string()]);
    }
}
