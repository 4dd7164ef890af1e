//! # Holocron Common Library
//!
//! Shared code for the Holocron movie catalog service:
//! - Error and result types
//! - Bootstrap configuration loading
//! - Token issuing/verification and route access decisions
//! - Password hashing
//! - Pagination arithmetic and response envelopes
//!
//! Nothing in here depends on an HTTP framework; the service crate wraps
//! these building blocks with axum extractors and middleware.

pub mod auth;
pub mod config;
pub mod error;
pub mod pagination;
pub mod response;

pub use error::{Error, Result};
