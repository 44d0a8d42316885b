//! Sync trigger handlers
//!
//! Both triggers return the structured SyncResult with HTTP 200 whether or
//! not every barangay succeeded - the result body is the report. Only
//! precondition violations (unknown barangay, CSRF) map to 4xx.

use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::api::dto::RegionSyncRequest;
use crate::app_state::AppState;
use crate::error::Result;
use crate::sync::SyncResult;

/// Sync every configured barangay from its sheet
///
/// @route POST /sync/sheets-to-database
/// @output Json<SyncResult> - One detail entry per configured barangay
/// @status 200 - Sync ran; per-barangay outcome in details[]
/// @status 403 - Missing or mismatched CSRF token
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/sync/sheets-to-database",
    tag = "sync",
    responses(
        (status = 200, description = "Sync report", body = SyncResult),
        (status = 403, description = "CSRF token missing or mismatched")
    )
))]
pub async fn trigger_full_sync(State(state): State<Arc<AppState>>) -> Json<SyncResult> {
    Json(state.engine.sync_all().await)
}

/// Sync exactly one barangay from its sheet
///
/// @route POST /sync/barangay-to-database
/// @input Json(barangay): String - Barangay from the configured region set
/// @output Json<SyncResult> - Single-entry details
/// @status 200 - Sync ran; outcome in details[]
/// @status 400 - Unknown barangay
/// @status 403 - Missing or mismatched CSRF token
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/sync/barangay-to-database",
    tag = "sync",
    request_body = RegionSyncRequest,
    responses(
        (status = 200, description = "Sync report", body = SyncResult),
        (status = 400, description = "Unknown barangay"),
        (status = 403, description = "CSRF token missing or mismatched")
    )
))]
pub async fn trigger_region_sync(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegionSyncRequest>,
) -> Result<Json<SyncResult>> {
    let result = state.engine.sync_one(&request.barangay).await?;
    Ok(Json(result))
}
