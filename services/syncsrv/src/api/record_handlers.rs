//! Read-path handlers: statistics and per-barangay crop data

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::api::dto::{CropDataQuery, CropDataResponse, StatisticsResponse};
use crate::app_state::AppState;
use crate::error::{Result, SyncSrvError};

/// All-barangay sync statistics
///
/// Pure read over committed state; recomputed on every call rather than
/// cached, so it always reflects whatever was last durably written.
///
/// @route GET /sync/statistics
/// @output Json<StatisticsResponse> - {success, statistics: {<barangay>: {total_records, recently_synced, last_sync}}}
/// @status 200 - Success
/// @status 500 - Database error
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/sync/statistics",
    tag = "sync",
    responses(
        (status = 200, description = "Per-barangay statistics"),
        (status = 500, description = "Database error")
    )
))]
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatisticsResponse>> {
    let statistics = state.store.statistics(&state.config.barangays).await?;
    Ok(Json(StatisticsResponse {
        success: true,
        statistics,
    }))
}

/// Crop records of one barangay
///
/// @route GET /barangay/crop-data?barangay=<name>
/// @input Query(barangay): String - Barangay from the configured region set
/// @output Json<CropDataResponse> - {success, data: [CropRecord]} in insertion order
/// @status 200 - Success
/// @status 400 - Unknown barangay
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/barangay/crop-data",
    tag = "records",
    params(
        ("barangay" = String, Query, description = "Barangay name")
    ),
    responses(
        (status = 200, description = "Records of the barangay"),
        (status = 400, description = "Unknown barangay")
    )
))]
pub async fn get_crop_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CropDataQuery>,
) -> Result<Json<CropDataResponse>> {
    if !state.config.knows_barangay(&query.barangay) {
        return Err(SyncSrvError::unknown_barangay(&query.barangay));
    }

    let data = state.store.records(&query.barangay).await?;
    Ok(Json(CropDataResponse {
        success: true,
        data,
    }))
}
