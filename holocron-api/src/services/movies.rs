//! Catalog operations behind the /movies endpoints

use holocron_common::pagination::{PageQuery, Paginated};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::db::movies::{Movie, MovieFields, MoviePatch, MovieStore};
use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct MovieService {
    store: Arc<dyn MovieStore>,
}

impl MovieService {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, fields: MovieFields) -> ApiResult<Movie> {
        let movie = self.store.create(fields).await?;
        info!(movie_id = %movie.id, title = %movie.title, "Created movie");
        Ok(movie)
    }

    pub async fn find_all(&self, query: PageQuery) -> ApiResult<Paginated<Movie>> {
        let pagination = query.resolve()?;
        let (movies, total) = self.store.find_all(pagination).await?;
        Ok(Paginated::new(movies, total, pagination))
    }

    /// Look up one movie. An id that is not a UUID cannot exist, so it is
    /// reported the same way as an unknown one.
    pub async fn find_one(&self, id: &str) -> ApiResult<Movie> {
        let found = match Uuid::parse_str(id) {
            Ok(uuid) => self.store.find_by_id(uuid).await?,
            Err(_) => None,
        };

        found.ok_or_else(|| not_found(id))
    }

    pub async fn update(&self, id: &str, patch: MoviePatch) -> ApiResult<Movie> {
        let mut movie = self.find_one(id).await?;
        patch.apply_to(&mut movie);

        let updated = self.store.update(&movie).await?;
        info!(movie_id = %updated.id, "Updated movie");
        Ok(updated)
    }

    /// Delete and return the removed movie.
    pub async fn remove(&self, id: &str) -> ApiResult<Movie> {
        let movie = self.find_one(id).await?;
        self.store.remove(&movie).await?;
        info!(movie_id = %movie.id, "Deleted movie");
        Ok(movie)
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Movie with ID {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;
    use holocron_common::Error;
    use crate::db::movies::SqliteMovieStore;
    use chrono::NaiveDate;

    async fn service() -> MovieService {
        let pool = init_memory_pool().await.unwrap();
        MovieService::new(Arc::new(SqliteMovieStore::new(pool)))
    }

    fn fields(title: &str) -> MovieFields {
        MovieFields {
            title: title.to_string(),
            episode_id: Some(6),
            opening_crawl: String::new(),
            director: "Richard Marquand".to_string(),
            producer: String::new(),
            release_date: NaiveDate::from_ymd_opt(1983, 5, 25).unwrap(),
            characters: vec![],
            planets: vec![],
            starships: vec![],
            vehicles: vec![],
            species: vec![],
            source_url: None,
            external_id: None,
        }
    }

    fn is_not_found(err: &ApiError) -> bool {
        matches!(err, ApiError::NotFound(_))
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids_are_not_found() {
        let service = service().await;

        let err = service.find_one(&Uuid::new_v4().to_string()).await.unwrap_err();
        assert!(is_not_found(&err));

        let err = service.find_one("not-a-uuid").await.unwrap_err();
        assert!(is_not_found(&err));
        assert_eq!(err.to_string(), "Resource not found: Movie with ID not-a-uuid not found");
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let service = service().await;
        let movie = service.create(fields("Return of the Jedi")).await.unwrap();

        let patch = MoviePatch {
            title: Some("Revenge of the Jedi".to_string()),
            ..Default::default()
        };
        let updated = service.update(&movie.id.to_string(), patch).await.unwrap();

        assert_eq!(updated.title, "Revenge of the Jedi");
        assert_eq!(updated.director, "Richard Marquand");
    }

    #[tokio::test]
    async fn test_remove_returns_movie_then_not_found() {
        let service = service().await;
        let movie = service.create(fields("Return of the Jedi")).await.unwrap();
        let id = movie.id.to_string();

        let removed = service.remove(&id).await.unwrap();
        assert_eq!(removed.id, movie.id);

        assert!(is_not_found(&service.remove(&id).await.unwrap_err()));
    }

    #[tokio::test]
    async fn test_find_all_rejects_bad_limit() {
        let service = service().await;
        let err = service
            .find_all(PageQuery { page: None, limit: Some(101) })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Common(Error::InvalidInput(_))));
    }
}
