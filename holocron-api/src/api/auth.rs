//! /auth endpoints

use axum::{extract::State, http::StatusCode, Extension, Json};
use holocron_common::auth::{CallerIdentity, UserRole};
use holocron_common::response::ApiResponse;
use serde::Deserialize;

use super::validation::{check_email, check_min_len, check_not_empty, Validate, ValidJson};
use crate::error::ApiResult;
use crate::services::{AuthSession, NewAccount};
use crate::AppState;

/// POST /auth/signup request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl Validate for SignupRequest {
    fn violations(&self) -> Vec<String> {
        let mut v = Vec::new();
        check_min_len(&mut v, "username", &self.username, 3);
        check_email(&mut v, "email", &self.email);
        check_min_len(&mut v, "password", &self.password, 6);
        v
    }
}

/// POST /auth/login request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn violations(&self) -> Vec<String> {
        let mut v = Vec::new();
        check_not_empty(&mut v, "username", &self.username);
        check_not_empty(&mut v, "password", &self.password);
        v
    }
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthSession>>)> {
    let session = state
        .auth
        .signup(NewAccount {
            username: request.username,
            email: request.email,
            password: request.password,
            role: request.role.unwrap_or_default(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("User registered successfully", session)),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthSession>>> {
    let session = state.auth.login(&request.username, &request.password).await?;
    Ok(Json(ApiResponse::new("Login successful", session)))
}

/// GET /auth/profile
pub async fn profile(Extension(caller): Extension<CallerIdentity>) -> Json<CallerIdentity> {
    Json(caller)
}
