//! services/api/src/web/middleware.rs
//!
//! The per-route identity gate. Each route is either public (no resolution
//! attempted), optional (a valid bearer token attaches a user, anything else
//! proceeds as guest), or required (anything short of a valid token is
//! rejected before the handler runs).

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Identity resolved for the current request, stored in request extensions.
/// `CallerIdentity(None)` means the request is proceeding as a guest.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity(pub Option<Uuid>);

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Middleware for routes that require a logged-in user.
///
/// Rejects with 401 before the handler when the token is missing, malformed,
/// or expired. On success the handler finds `CallerIdentity(Some(_))` in the
/// request extensions.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = bearer_token(&req)
        .and_then(|token| state.tokens.verify(token))
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(CallerIdentity(Some(user_id)));
    Ok(next.run(req).await)
}

/// Middleware for guest-friendly routes.
///
/// A valid bearer token attaches the user identity; an absent or invalid one
/// attaches no identity and the request proceeds as guest. This never
/// rejects — an expired token on an optional route is a guest, not an error.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let user_id = bearer_token(&req).and_then(|token| state.tokens.verify(token));
    req.extensions_mut().insert(CallerIdentity(user_id));
    next.run(req).await
}
