//! Wire types for the Synchronization Service API
//!
//! The read endpoints carry their payload under contract-specific keys
//! (`statistics`, `data`) rather than the generic envelope, matching what
//! the dashboard front end consumes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::{CropRecord, RegionStatistics};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Response of GET /sync/statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StatisticsResponse {
    #[serde(default = "common::serde_helpers::bool_true")]
    pub success: bool,
    /// Per-barangay aggregates
    pub statistics: BTreeMap<String, RegionStatistics>,
}

/// Response of GET /barangay/crop-data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CropDataResponse {
    #[serde(default = "common::serde_helpers::bool_true")]
    pub success: bool,
    /// Records of the requested barangay, insertion order
    pub data: Vec<CropRecord>,
}

/// Query parameters of GET /barangay/crop-data
#[derive(Debug, Clone, Deserialize)]
pub struct CropDataQuery {
    pub barangay: String,
}

/// Request body of POST /sync/barangay-to-database
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RegionSyncRequest {
    pub barangay: String,
}
