//! Shared test scaffolding and utilities
//!
//! Provides a provisioned service environment (temporary SQLite database,
//! temporary sheet directory, router) and request helpers for driving the
//! API through tower.

#![allow(clippy::disallowed_methods)] // Integration test - unwrap is acceptable
#![allow(dead_code)] // Not every test file uses every helper

use std::io::Write;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use syncsrv::app_state::AppState;
use syncsrv::config::SyncSrvConfig;
use syncsrv::routes::create_routes;
use syncsrv::sheets::CsvSheetSource;
use syncsrv::store::CropStore;
use syncsrv::sync::SyncEngine;

pub const TEST_CSRF_TOKEN: &str = "test-csrf-token";

pub const SHEET_HEADER: &str =
    "Farmer Name,Farm Location,Crop Planted,Planting Date,Harvest Date,Total Area,Total Yield";

/// Test environment context containing all required resources
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub state: Arc<AppState>,
}

impl TestEnv {
    /// Create a fully provisioned test environment with the given barangays
    pub async fn with_barangays(barangays: &[&str]) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let sheets_dir = temp_dir.path().join("sheets");
        std::fs::create_dir_all(&sheets_dir).unwrap();
        let db_path = temp_dir.path().join("test_cropsync.db");

        let mut config = SyncSrvConfig::default();
        config.barangays = barangays.iter().map(|s| s.to_string()).collect();
        config.database.path = db_path.display().to_string();
        config.sheets.dir = sheets_dir.display().to_string();
        config.security.csrf_token = TEST_CSRF_TOKEN.to_string();
        config.validate().unwrap();

        let store = CropStore::connect(&config.database_url()).await.unwrap();
        let source = Arc::new(CsvSheetSource::new(&config.sheets.dir));
        let engine = SyncEngine::new(store.clone(), source, config.barangays.clone());

        let state = Arc::new(AppState::new(Arc::new(config), store, engine));
        Self { temp_dir, state }
    }

    /// Default three-barangay environment
    pub async fn create() -> Self {
        Self::with_barangays(&["Bagong Silang", "San Isidro", "Poblacion"]).await
    }

    /// Build a fresh router over the shared state
    pub fn router(&self) -> Router {
        create_routes(self.state.clone())
    }

    /// Write (or replace) a barangay's sheet with the given data rows
    pub fn write_sheet(&self, barangay: &str, rows: &[&str]) {
        let path = self
            .state
            .config
            .sheets
            .dir
            .clone();
        let file_name = CsvSheetSource::sheet_file_name(barangay);
        let mut file = std::fs::File::create(std::path::Path::new(&path).join(file_name)).unwrap();
        writeln!(file, "{}", SHEET_HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
    }

    /// Remove a barangay's sheet so its sync fails
    pub fn remove_sheet(&self, barangay: &str) {
        let path = std::path::Path::new(&self.state.config.sheets.dir)
            .join(CsvSheetSource::sheet_file_name(barangay));
        let _ = std::fs::remove_file(path);
    }
}

/// Issue a GET request against the router
pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Issue a POST request with the CSRF token and an optional JSON body
pub async fn post_with_token(
    router: &Router,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::ACCEPT, "application/json");
    if let Some(token) = token {
        builder = builder.header("X-CSRF-TOKEN", token);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(request).await.unwrap()
}

/// Collect a response body into JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status code and return the JSON body
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
