//! HTTP API handlers

pub mod access;
pub mod auth;
pub mod health;
pub mod movies;
pub mod sync;
pub mod validation;

pub use access::guarded;
pub use auth::{login, profile, signup};
pub use health::health_check;
pub use movies::{create_movie, delete_movie, get_movie, list_movies, update_movie};
pub use sync::trigger_sync;
