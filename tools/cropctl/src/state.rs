//! Client view state
//!
//! One explicit state struct driven by a single `apply` function instead
//! of scattered flags. Every fetch is tagged with a monotonically
//! increasing request id per (region, mode) key; a response whose id is
//! not the latest issued for its key is discarded, so a slow stale
//! response can never overwrite a newer one.

use std::collections::BTreeMap;
use std::collections::HashMap;

use syncsrv::store::{CropRecord, RegionStatistics};
use syncsrv::sync::SyncResult;

use crate::filter::filter_records;

/// What the view is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    Data,
    Statistics,
}

/// Fetch identity: one sequence counter per (region, mode)
type FetchKey = (String, ViewMode);

/// Statistics fetches are not scoped to a region
const ALL_REGIONS: &str = "";

/// State transitions
#[derive(Debug, Clone)]
pub enum Action {
    /// Switch the viewed region; clears the region-scoped filter
    SelectRegion(String),
    /// Switch between record and statistics view
    SetMode(ViewMode),
    /// Update the record filter query
    SetFilter(String),
    /// Records arrived for a region
    RecordsLoaded {
        region: String,
        token: u64,
        records: Vec<CropRecord>,
    },
    /// A record fetch failed; loading ends, previous records stay
    RecordsFailed { region: String, token: u64 },
    /// Statistics arrived
    StatisticsLoaded {
        token: u64,
        statistics: BTreeMap<String, RegionStatistics>,
    },
    /// A statistics fetch failed; previous statistics stay
    StatisticsFailed { token: u64 },
    /// A sync completed (success or synthetic failure)
    SyncFinished(SyncResult),
}

/// Serializable client view state
#[derive(Debug, Default)]
pub struct ViewState {
    /// Currently selected region, if any
    pub region: Option<String>,
    /// Current view mode
    pub mode: Option<ViewMode>,
    /// True while a record fetch or sync is in flight
    pub loading: bool,
    /// Region-scoped filter query
    pub filter: String,
    /// Records of the selected region (unfiltered source set)
    pub records: Vec<CropRecord>,
    /// Last fetched statistics
    pub statistics: BTreeMap<String, RegionStatistics>,
    /// Outcome of the last sync, kept for display
    pub last_result: Option<SyncResult>,
    /// Latest issued request id per fetch key
    issued: HashMap<FetchKey, u64>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a request id for a record fetch of the given region
    ///
    /// Marks the view as loading; the returned token must accompany the
    /// RecordsLoaded/RecordsFailed action.
    pub fn begin_record_fetch(&mut self, region: &str) -> u64 {
        self.loading = true;
        self.next_token((region.to_string(), ViewMode::Data))
    }

    /// Issue a request id for a statistics fetch
    pub fn begin_statistics_fetch(&mut self) -> u64 {
        self.next_token((ALL_REGIONS.to_string(), ViewMode::Statistics))
    }

    /// Try to start a sync; refused while another operation is in flight
    pub fn begin_sync(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Apply one action; returns false when a stale response was discarded
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::SelectRegion(region) => {
                if self.region.as_deref() != Some(region.as_str()) {
                    // Filter state is region-scoped, not global
                    self.filter.clear();
                    self.records.clear();
                }
                self.region = Some(region);
                true
            },
            Action::SetMode(mode) => {
                self.mode = Some(mode);
                true
            },
            Action::SetFilter(query) => {
                self.filter = query;
                true
            },
            Action::RecordsLoaded {
                region,
                token,
                records,
            } => {
                if !self.is_latest(&(region.clone(), ViewMode::Data), token) {
                    return false;
                }
                self.loading = false;
                // Only the currently viewed region's records are shown
                if self.region.as_deref() == Some(region.as_str()) {
                    self.records = records;
                }
                true
            },
            Action::RecordsFailed { region, token } => {
                if !self.is_latest(&(region, ViewMode::Data), token) {
                    return false;
                }
                self.loading = false;
                true
            },
            Action::StatisticsLoaded { token, statistics } => {
                if !self.is_latest(&(ALL_REGIONS.to_string(), ViewMode::Statistics), token) {
                    return false;
                }
                self.statistics = statistics;
                true
            },
            Action::StatisticsFailed { token } => {
                self.is_latest(&(ALL_REGIONS.to_string(), ViewMode::Statistics), token)
            },
            Action::SyncFinished(result) => {
                self.loading = false;
                self.last_result = Some(result);
                true
            },
        }
    }

    /// Records visible under the current filter, in source order
    ///
    /// Pure projection: never mutates the fetched set.
    pub fn visible_records(&self) -> Vec<&CropRecord> {
        filter_records(&self.records, &self.filter)
    }

    /// Whether a finished sync should refresh the viewed record list
    ///
    /// True when the view is in data mode and the synced region (None =
    /// all regions) covers the one on screen.
    pub fn wants_record_refresh(&self, synced_region: Option<&str>) -> bool {
        if self.mode != Some(ViewMode::Data) {
            return false;
        }
        match (&self.region, synced_region) {
            (Some(_), None) => true,
            (Some(current), Some(synced)) => current == synced,
            (None, _) => false,
        }
    }

    fn next_token(&mut self, key: FetchKey) -> u64 {
        let counter = self.issued.entry(key).or_insert(0);
        *counter += 1;
        *counter
    }

    fn is_latest(&self, key: &FetchKey, token: u64) -> bool {
        self.issued.get(key).copied() == Some(token)
    }
}
