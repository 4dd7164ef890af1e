//! Per-route access enforcement
//!
//! Each route is registered with its own [`RouteRequirement`]. The guard
//! runs before the handler: public routes pass straight through, every other
//! route verifies the bearer token, applies the role decision and attaches
//! the caller's identity to the request extensions for the handler.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use holocron_common::auth::{authorize, RouteRequirement, TokenVerifier};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Verifier plus the requirement of the route it guards
#[derive(Clone)]
pub struct AccessGuard {
    verifier: Arc<TokenVerifier>,
    requirement: RouteRequirement,
}

impl AccessGuard {
    pub fn new(verifier: Arc<TokenVerifier>, requirement: RouteRequirement) -> Self {
        Self {
            verifier,
            requirement,
        }
    }
}

/// Wrap `method_router` so it only runs when `requirement` is met.
pub fn guarded(
    method_router: MethodRouter<AppState>,
    state: &AppState,
    requirement: RouteRequirement,
) -> MethodRouter<AppState> {
    let guard = AccessGuard::new(state.verifier.clone(), requirement);
    method_router.route_layer(middleware::from_fn_with_state(guard, enforce_access))
}

/// Access middleware
///
/// 401 when credentials are missing or invalid, 403 when the caller's role
/// is not permitted.
pub async fn enforce_access(
    State(guard): State<AccessGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if guard.requirement.is_public() {
        return Ok(next.run(request).await);
    }

    // A header that is not visible ASCII cannot carry a valid token
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or(""));

    let caller = authorize(&guard.requirement, header, guard.verifier.as_ref()).map_err(|denied| {
        debug!(path = %request.uri().path(), reason = %denied, "Access denied");
        ApiError::from(denied)
    })?;

    if let Some(caller) = caller {
        request.extensions_mut().insert(caller);
    }

    Ok(next.run(request).await)
}
