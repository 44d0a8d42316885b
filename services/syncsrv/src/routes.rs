//! API Route Configuration
//!
//! Central route definition for all Synchronization Service endpoints

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

#[cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::api::csrf::require_csrf_token;
use crate::api::health_handlers::health_check;
use crate::api::record_handlers::{get_crop_data, get_statistics};
use crate::api::sync_handlers::{trigger_full_sync, trigger_region_sync};
use crate::app_state::AppState;

// OpenAPI documentation - only compiled when the openapi feature is enabled
#[cfg(feature = "openapi")]
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::record_handlers::get_statistics,
        crate::api::record_handlers::get_crop_data,
        crate::api::sync_handlers::trigger_full_sync,
        crate::api::sync_handlers::trigger_region_sync,
    ),
    components(
        schemas(
            crate::api::dto::RegionSyncRequest,
            crate::sync::SyncResult,
            crate::sync::SyncDetail,
        )
    ),
    tags(
        (name = "sync", description = "Sheet-to-database synchronization"),
        (name = "records", description = "Synced crop record queries")
    )
)]
pub struct SyncSrvApiDoc;

/// Create all API routes for the Synchronization Service
pub fn create_routes(state: Arc<AppState>) -> Router {
    // Sync triggers mutate the store; they sit behind the CSRF guard
    let sync_triggers = Router::new()
        .route("/sync/sheets-to-database", post(trigger_full_sync))
        .route("/sync/barangay-to-database", post(trigger_region_sync))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_csrf_token,
        ));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Read path
        .route("/sync/statistics", get(get_statistics))
        .route("/barangay/crop-data", get(get_crop_data))
        .merge(sync_triggers)
        // Apply HTTP request logging middleware
        .layer(middleware::from_fn(common::logging::http_request_logger))
        .with_state(state)
}
