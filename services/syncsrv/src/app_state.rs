//! Application State Management
//!
//! Central application state that is shared across all API handlers

use std::sync::Arc;
use std::time::Instant;

use crate::config::SyncSrvConfig;
use crate::store::CropStore;
use crate::sync::SyncEngine;

/// Application state containing shared resources
pub struct AppState {
    /// Service configuration
    pub config: Arc<SyncSrvConfig>,

    /// Crop record store
    pub store: CropStore,

    /// Sheet-to-database sync engine
    pub engine: SyncEngine,

    /// Service start time (health reporting)
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Arc<SyncSrvConfig>, store: CropStore, engine: SyncEngine) -> Self {
        Self {
            config,
            store,
            engine,
            started_at: Instant::now(),
        }
    }
}
