//! holocron-api library - movie catalog service
//!
//! Accounts with bearer-token login, a role-gated movie catalog and a
//! synchronizer that mirrors the Star Wars API film list into the catalog.

use axum::Router;
use chrono::{DateTime, Utc};
use holocron_common::auth::{PasswordHasher, TokenIssuer, TokenVerifier};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod swapi;
pub mod sync;

use db::movies::{MovieStore, SqliteMovieStore};
use db::users::UserStore;
use services::{AuthService, MovieService};
use swapi::FilmSource;
use sync::FilmSynchronizer;

/// Token and password settings
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_expiration_secs: i64,
    pub password_hasher: PasswordHasher,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>, jwt_expiration_secs: i64) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            jwt_expiration_secs,
            password_hasher: PasswordHasher::default(),
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub auth: AuthService,
    pub movies: MovieService,
    pub synchronizer: Arc<FilmSynchronizer>,
    /// Shared by every access guard
    pub verifier: Arc<TokenVerifier>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create application state over `db`, syncing from `film_source`
    pub fn new(db: SqlitePool, settings: AuthSettings, film_source: Arc<dyn FilmSource>) -> Self {
        let movie_store: Arc<dyn MovieStore> = Arc::new(SqliteMovieStore::new(db.clone()));
        let issuer = Arc::new(TokenIssuer::new(
            &settings.jwt_secret,
            settings.jwt_expiration_secs,
        ));

        Self {
            auth: AuthService::new(UserStore::new(db.clone()), settings.password_hasher, issuer),
            movies: MovieService::new(movie_store.clone()),
            synchronizer: Arc::new(FilmSynchronizer::new(film_source, movie_store)),
            verifier: Arc::new(TokenVerifier::new(&settings.jwt_secret)),
            startup_time: Utc::now(),
            db,
        }
    }
}

/// Build application router
///
/// Every route carries its own access requirement.
pub fn build_router(state: AppState) -> Router {
    use api::guarded;
    use axum::routing::{delete, get, patch, post};
    use holocron_common::auth::{RouteRequirement, UserRole};

    let public = || RouteRequirement::Public;
    let any_role = || RouteRequirement::roles(&[UserRole::User, UserRole::Admin]);
    let admin = RouteRequirement::admin_only;

    Router::new()
        .route("/health", guarded(get(api::health_check), &state, public()))
        // Accounts
        .route("/auth/signup", guarded(post(api::signup), &state, public()))
        .route("/auth/login", guarded(post(api::login), &state, public()))
        .route(
            "/auth/profile",
            guarded(get(api::profile), &state, RouteRequirement::AuthenticatedOnly),
        )
        // Catalog
        .route("/movies", guarded(get(api::list_movies), &state, public()))
        .route("/movies", guarded(post(api::create_movie), &state, admin()))
        .route("/movies/:id", guarded(get(api::get_movie), &state, any_role()))
        .route("/movies/:id", guarded(patch(api::update_movie), &state, admin()))
        .route("/movies/:id", guarded(delete(api::delete_movie), &state, admin()))
        // Synchronization
        .route("/star-wars/sync", guarded(post(api::trigger_sync), &state, admin()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
