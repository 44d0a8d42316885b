//! HTTP client for the sync service
//!
//! All responses are parsed into typed structs at this boundary; malformed
//! payloads fail closed as transport errors instead of leaking partial
//! data into the view. Sync triggers never raise transport errors upward -
//! they come back as a synthetic failure SyncResult so callers always have
//! a renderable report.

use std::collections::BTreeMap;

use thiserror::Error;

use syncsrv::api::dto::{CropDataResponse, StatisticsResponse};
use syncsrv::store::{CropRecord, RegionStatistics};
use syncsrv::sync::SyncResult;

/// Header carrying the CSRF token
const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// Client-side errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure, non-2xx status or malformed response body
    #[error("Transport error: {0}")]
    Transport(String),

    /// Sync was requested but no CSRF token is configured
    #[error(
        "No CSRF token configured; set csrf_token in cropctl.yaml or the CROPCTL_TOKEN variable"
    )]
    MissingCsrfToken,
}

/// Typed client over the sync service HTTP API
pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl SyncClient {
    pub fn new(base_url: impl Into<String>, csrf_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            csrf_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// GET /sync/statistics
    ///
    /// Pure read; callers decide whether a failure is surfaced or
    /// suppressed (see ReadFailurePolicy).
    pub async fn fetch_statistics(
        &self,
    ) -> Result<BTreeMap<String, RegionStatistics>, ClientError> {
        let response = self
            .http
            .get(self.url("/sync/statistics"))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "GET /sync/statistics returned {}",
                response.status()
            )));
        }

        let parsed: StatisticsResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Transport(format!("Malformed statistics response: {}", e)))?;
        Ok(parsed.statistics)
    }

    /// GET /barangay/crop-data?barangay=<name>
    pub async fn fetch_records(&self, barangay: &str) -> Result<Vec<CropRecord>, ClientError> {
        let response = self
            .http
            .get(self.url("/barangay/crop-data"))
            .query(&[("barangay", barangay)])
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "GET /barangay/crop-data returned {}: {}",
                response.status(),
                error_message(response).await,
            )));
        }

        let parsed: CropDataResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Transport(format!("Malformed crop-data response: {}", e)))?;
        Ok(parsed.data)
    }

    /// GET /health, reported as a raw JSON value
    pub async fn fetch_health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self
            .http
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Transport(format!("Malformed health response: {}", e)))
    }

    /// POST /sync/sheets-to-database
    ///
    /// Transport failures become a synthetic failure SyncResult. The only
    /// hard error is a missing CSRF token, which fails fast before any
    /// request is sent.
    pub async fn sync_all(&self) -> Result<SyncResult, ClientError> {
        let token = self.require_token()?;
        Ok(self
            .post_sync(self.url("/sync/sheets-to-database"), token, None)
            .await)
    }

    /// POST /sync/barangay-to-database
    pub async fn sync_one(&self, barangay: &str) -> Result<SyncResult, ClientError> {
        let token = self.require_token()?;
        let body = serde_json::json!({ "barangay": barangay });
        Ok(self
            .post_sync(self.url("/sync/barangay-to-database"), token, Some(body))
            .await)
    }

    fn require_token(&self) -> Result<&str, ClientError> {
        self.csrf_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ClientError::MissingCsrfToken)
    }

    async fn post_sync(
        &self,
        url: String,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> SyncResult {
        let mut request = self
            .http
            .post(url)
            .header(CSRF_HEADER, token)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return SyncResult::failure(format!("Sync request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return SyncResult::failure(format!(
                "Sync request returned {}: {}",
                status,
                error_message(response).await,
            ));
        }

        match response.json::<SyncResult>().await {
            Ok(result) => result,
            Err(e) => SyncResult::failure(format!("Malformed sync response: {}", e)),
        }
    }
}

/// Pull the error message out of a structured error body, if there is one
async fn error_message(response: reqwest::Response) -> String {
    match response.json::<common::ErrorResponse>().await {
        Ok(body) => body.error.message,
        Err(_) => "no further detail".to_string(),
    }
}
