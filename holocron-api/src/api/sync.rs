//! /star-wars endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::error::ApiResult;
use crate::sync::SyncOutcome;
use crate::AppState;

/// POST /star-wars/sync
///
/// Runs one synchronization immediately. Waits for a run already in
/// progress to finish first.
pub async fn trigger_sync(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<SyncOutcome>)> {
    let outcome = state.synchronizer.run().await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
