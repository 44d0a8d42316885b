//! Health check handler

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, response::Json};
use common::{ComponentHealth, HealthStatus, ServiceStatus, SuccessResponse};

use crate::app_state::AppState;

/// Service health with a database reachability check
///
/// @route GET /health
/// @output Json<SuccessResponse<HealthStatus>>
/// @status 200 - Always; degraded state is reported in the body
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Json<SuccessResponse<HealthStatus>> {
    let mut checks = HashMap::new();

    let db_start = Instant::now();
    let db_health = match state.store.ping().await {
        Ok(_) => ComponentHealth {
            status: ServiceStatus::Healthy,
            message: None,
            duration_ms: Some(db_start.elapsed().as_millis() as u64),
        },
        Err(e) => ComponentHealth {
            status: ServiceStatus::Unhealthy,
            message: Some(e.to_string()),
            duration_ms: Some(db_start.elapsed().as_millis() as u64),
        },
    };
    let overall = db_health.status;
    checks.insert("database".to_string(), db_health);

    Json(SuccessResponse::new(HealthStatus {
        status: overall,
        service: state.config.service.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now(),
        checks,
    }))
}
