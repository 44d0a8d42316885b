//! Spreadsheet source for crop records
//!
//! Reads per-barangay spreadsheet exports and turns them into rows ready
//! for upserting. The source is a trait so the sync engine can be driven
//! from fixtures in tests.

use anyhow::Context;
use async_trait::async_trait;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, SyncSrvError};

/// One spreadsheet row in crop record shape
///
/// Field values stay free text exactly as exported; empty optional cells
/// become empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRow {
    #[serde(
        rename = "Farmer Name",
        deserialize_with = "common::serde_helpers::deserialize_trimmed"
    )]
    pub name: String,

    #[serde(
        rename = "Farm Location",
        default,
        deserialize_with = "common::serde_helpers::deserialize_trimmed"
    )]
    pub place: String,

    #[serde(
        rename = "Crop Planted",
        deserialize_with = "common::serde_helpers::deserialize_trimmed"
    )]
    pub crop: String,

    #[serde(
        rename = "Planting Date",
        default,
        deserialize_with = "common::serde_helpers::deserialize_trimmed"
    )]
    pub planting_date: String,

    #[serde(
        rename = "Harvest Date",
        default,
        deserialize_with = "common::serde_helpers::deserialize_trimmed"
    )]
    pub harvest_date: String,

    #[serde(
        rename = "Total Area",
        default,
        deserialize_with = "common::serde_helpers::deserialize_trimmed"
    )]
    pub total_area: String,

    #[serde(
        rename = "Total Yield",
        default,
        deserialize_with = "common::serde_helpers::deserialize_trimmed"
    )]
    pub total_yield: String,
}

impl SheetRow {
    /// A row must at least name the farmer and the crop to be ingestable
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.crop.is_empty()
    }
}

/// Rows read from one barangay's sheet, plus the count of rows that could
/// not be parsed or failed validation
#[derive(Debug, Clone, Default)]
pub struct SheetBatch {
    pub rows: Vec<SheetRow>,
    pub skipped: u64,
}

/// Source of spreadsheet rows for a barangay
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch all rows for one barangay
    ///
    /// A missing or unreadable sheet is an error (the region fails as a
    /// unit); a malformed row inside a readable sheet is counted in
    /// `skipped` and ingestion continues.
    async fn fetch_rows(&self, barangay: &str) -> Result<SheetBatch>;
}

/// CSV-file-backed sheet source
///
/// Expects one export per barangay under the base directory, named after
/// the barangay in lower snake case (e.g. "Bagong Silang" →
/// `bagong_silang.csv`).
pub struct CsvSheetSource {
    base_dir: PathBuf,
}

impl CsvSheetSource {
    /// Create a new CSV source with base path
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// File name a barangay's export is expected under
    pub fn sheet_file_name(barangay: &str) -> String {
        let slug: String = barangay
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        format!("{}.csv", slug)
    }

    /// Full path of a barangay's sheet file
    pub fn sheet_path(&self, barangay: &str) -> PathBuf {
        self.base_dir.join(Self::sheet_file_name(barangay))
    }
}

#[async_trait]
impl SheetSource for CsvSheetSource {
    async fn fetch_rows(&self, barangay: &str) -> Result<SheetBatch> {
        let path = self.sheet_path(barangay);

        if !path.exists() {
            return Err(SyncSrvError::sheet_not_found(path.display()));
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read sheet: {}", path.display()))
            .map_err(|e| SyncSrvError::sheet(e.to_string()))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut batch = SheetBatch::default();

        for (index, result) in reader.deserialize::<SheetRow>().enumerate() {
            match result {
                Ok(row) if row.is_valid() => batch.rows.push(row),
                Ok(_) => {
                    warn!(
                        "Skipping row {} of {}: missing farmer name or crop",
                        index + 2,
                        path.display()
                    );
                    batch.skipped += 1;
                },
                Err(e) => {
                    warn!("Skipping row {} of {}: {}", index + 2, path.display(), e);
                    batch.skipped += 1;
                },
            }
        }

        Ok(batch)
    }
}
