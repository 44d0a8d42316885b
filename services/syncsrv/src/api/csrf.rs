//! CSRF token guard for sync trigger endpoints
//!
//! Sync POSTs mutate the store on behalf of a browser session, so they
//! carry the page's CSRF token in the X-CSRF-TOKEN header. The guard
//! rejects requests whose token is missing or does not match the
//! configured value.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::error::SyncSrvError;

/// Header carrying the CSRF token
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Reject sync POSTs without a matching X-CSRF-TOKEN header
pub async fn require_csrf_token(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        None => SyncSrvError::permission("Missing X-CSRF-TOKEN header").into_response(),
        Some(token) if token != state.config.security.csrf_token => {
            SyncSrvError::permission("CSRF token mismatch").into_response()
        },
        Some(_) => next.run(req).await,
    }
}
