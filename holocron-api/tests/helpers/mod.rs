//! Test Helper Utilities
//!
//! Shared fakes for holocron-api tests

#![allow(dead_code)]

pub mod film_source;

pub use film_source::{film, FakeFilmSource, Listing};
