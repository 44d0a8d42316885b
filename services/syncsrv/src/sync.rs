//! Sheet-to-database sync engine
//!
//! Orchestrates ingestion per barangay. Every barangay is an independent
//! unit of work with its own transaction: one failing sheet produces a
//! failure entry in the result without aborting or rolling back its
//! siblings, and the full-sync result always carries exactly one detail
//! entry per configured barangay, in configuration order.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{Result, SyncSrvError};
use crate::sheets::SheetSource;
use crate::store::{CropStore, SyncRunRecord};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Outcome of one barangay within a sync invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SyncDetail {
    /// Sheet ingested; `synced` rows inserted or changed, `errors` rows
    /// skipped as malformed
    Success {
        barangay: String,
        synced: u64,
        errors: u64,
    },
    /// Sheet could not be ingested at all
    Failure { barangay: String, message: String },
}

impl SyncDetail {
    pub fn barangay(&self) -> &str {
        match self {
            SyncDetail::Success { barangay, .. } => barangay,
            SyncDetail::Failure { barangay, .. } => barangay,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SyncDetail::Success { .. })
    }
}

/// Structured outcome of one sync invocation, covering one or many barangays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SyncResult {
    /// True only if every attempted barangay succeeded
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// One entry per attempted barangay, in attempt order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<SyncDetail>,
}

impl SyncResult {
    /// Build a result from per-barangay details
    pub fn from_details(details: Vec<SyncDetail>) -> Self {
        let failed = details.iter().filter(|d| !d.is_success()).count();
        let success = failed == 0;
        let message = if success {
            format!("Synced {} barangay(s)", details.len())
        } else {
            format!("{} of {} barangay(s) failed", failed, details.len())
        };
        Self {
            success,
            message,
            details,
        }
    }

    /// A failure result with no per-barangay breakdown (client-side
    /// synthetic results for transport errors use this too)
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: Vec::new(),
        }
    }
}

/// Per-barangay sync orchestrator
#[derive(Clone)]
pub struct SyncEngine {
    store: CropStore,
    source: Arc<dyn SheetSource>,
    barangays: Vec<String>,
}

impl SyncEngine {
    pub fn new(store: CropStore, source: Arc<dyn SheetSource>, barangays: Vec<String>) -> Self {
        Self {
            store,
            source,
            barangays,
        }
    }

    /// The configured barangay list, in declaration order
    pub fn barangays(&self) -> &[String] {
        &self.barangays
    }

    /// Sync every configured barangay
    ///
    /// Produces exactly one detail entry per barangay in configuration
    /// order. A failing barangay is reported and its siblings still run;
    /// committed writes of successful barangays are never rolled back.
    pub async fn sync_all(&self) -> SyncResult {
        info!("Full sync started: {} barangay(s)", self.barangays.len());

        let mut details = Vec::with_capacity(self.barangays.len());
        for barangay in &self.barangays {
            details.push(self.sync_region(barangay).await);
        }

        let result = SyncResult::from_details(details);
        if result.success {
            info!("Full sync finished: {}", result.message);
        } else {
            error!("Full sync finished with failures: {}", result.message);
        }
        result
    }

    /// Sync exactly one barangay
    ///
    /// Unknown barangays are a validation error (the region set is fixed
    /// by configuration, there is no dynamic discovery).
    pub async fn sync_one(&self, barangay: &str) -> Result<SyncResult> {
        if !self.barangays.iter().any(|b| b == barangay) {
            return Err(SyncSrvError::unknown_barangay(barangay));
        }

        let detail = self.sync_region(barangay).await;
        Ok(SyncResult::from_details(vec![detail]))
    }

    /// Ingest one barangay's sheet and record the attempt
    async fn sync_region(&self, barangay: &str) -> SyncDetail {
        let started_at = now_stamp();

        match self.ingest(barangay, &started_at).await {
            Ok((synced, errors)) => {
                let finished_at = now_stamp();
                info!(
                    "Synced {}: {} row(s) applied, {} skipped",
                    barangay, synced, errors
                );
                self.record_run_logged(&SyncRunRecord {
                    barangay: barangay.to_string(),
                    started_at,
                    finished_at,
                    status: "success".to_string(),
                    synced: synced as i64,
                    errors: errors as i64,
                    message: None,
                })
                .await;

                SyncDetail::Success {
                    barangay: barangay.to_string(),
                    synced,
                    errors,
                }
            },
            Err(e) => {
                let finished_at = now_stamp();
                error!("Sync failed for {}: {}", barangay, e);
                self.record_run_logged(&SyncRunRecord {
                    barangay: barangay.to_string(),
                    started_at,
                    finished_at,
                    status: "failure".to_string(),
                    synced: 0,
                    errors: 0,
                    message: Some(e.to_string()),
                })
                .await;

                SyncDetail::Failure {
                    barangay: barangay.to_string(),
                    message: e.to_string(),
                }
            },
        }
    }

    /// Fetch rows and apply them inside the barangay's transaction
    async fn ingest(&self, barangay: &str, stamp: &str) -> Result<(u64, u64)> {
        let batch = self.source.fetch_rows(barangay).await?;
        let synced = self.store.apply_rows(barangay, &batch.rows, stamp).await?;
        Ok((synced, batch.skipped))
    }

    /// Audit trail writes must not mask the sync outcome
    async fn record_run_logged(&self, run: &SyncRunRecord) {
        if let Err(e) = self.store.record_run(run).await {
            error!("Failed to record sync run for {}: {}", run.barangay, e);
        }
    }
}

/// RFC 3339 UTC timestamp used for run stamps and synced_at
fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
