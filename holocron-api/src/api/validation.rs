//! Request body validation
//!
//! [`ValidJson`] deserializes the body (request types reject unknown fields)
//! and then runs the type's [`Validate`] rules. Either failure is a 400.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::db::movies::RELEASE_DATE_FORMAT;
use crate::error::ApiError;

/// Field-level rules run after deserialization
pub trait Validate {
    /// Every rule violation, in field order.
    fn violations(&self) -> Vec<String>;
}

/// JSON body extractor that enforces [`Validate`]
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        let violations = value.violations();
        if !violations.is_empty() {
            return Err(ApiError::BadRequest(violations.join("; ")));
        }

        Ok(ValidJson(value))
    }
}

pub(crate) fn check_not_empty(violations: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        violations.push(format!("{} should not be empty", field));
    }
}

pub(crate) fn check_min_len(violations: &mut Vec<String>, field: &str, value: &str, min: usize) {
    if value.chars().count() < min {
        violations.push(format!(
            "{} must be longer than or equal to {} characters",
            field, min
        ));
    }
}

pub(crate) fn check_email(violations: &mut Vec<String>, field: &str, value: &str) {
    if !is_email(value) {
        violations.push(format!("{} must be an email", field));
    }
}

pub(crate) fn check_release_date(violations: &mut Vec<String>, field: &str, value: &str) {
    if parse_release_date(value).is_none() {
        violations.push(format!("{} must be a valid YYYY-MM-DD date", field));
    }
}

pub(crate) fn parse_release_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, RELEASE_DATE_FORMAT).ok()
}

/// `local@domain.tld`: one `@`, no whitespace, a dot inside the domain.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2 && !host.starts_with('.'),
        None => false,
    }
}
