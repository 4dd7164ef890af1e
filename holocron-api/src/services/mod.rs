//! Business logic between HTTP handlers and storage

pub mod auth;
pub mod movies;

pub use auth::{AuthService, AuthSession, NewAccount};
pub use movies::MovieService;
