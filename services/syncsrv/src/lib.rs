//! SyncSrv - Crop Record Synchronization Service
//!
//! Pulls per-barangay crop records out of spreadsheet exports and upserts
//! them into the local SQLite store. Each barangay is its own unit of work:
//! a failing sheet is reported per region without aborting its siblings,
//! and re-running a sync on unchanged source data changes nothing.

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod routes;
pub mod sheets;
pub mod store;
pub mod sync;

pub use app_state::AppState;
pub use config::SyncSrvConfig;
pub use error::{Result, SyncSrvError};
pub use store::{CropRecord, CropStore, RegionStatistics};
pub use sync::{SyncDetail, SyncEngine, SyncResult};
