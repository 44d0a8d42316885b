//! Crop record store for SyncSrv
//!
//! SQLite-backed persistence for synced crop records and the per-barangay
//! sync run audit trail. Statistics are derived from committed state rather
//! than kept as mutable counters, so a crash between a sync and a
//! statistics read can never leave the two disagreeing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::sheets::SheetRow;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// One synced crop record attributed to a barangay
///
/// All descriptive fields are free text exactly as they appear in the
/// source spreadsheet; nothing is parsed into numeric or date types here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CropRecord {
    /// Server-assigned identifier, stable across syncs
    pub id: i64,
    pub barangay: String,
    pub name: String,
    pub place: String,
    pub crop: String,
    pub planting_date: String,
    pub harvest_date: String,
    pub total_area: String,
    pub total_yield: String,
    /// Last time a sync inserted or changed this record (RFC 3339)
    pub synced_at: String,
    /// First time a sync inserted this record (RFC 3339)
    pub created_at: String,
}

/// Per-barangay aggregate statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RegionStatistics {
    /// Count of all records attributed to the barangay
    pub total_records: i64,
    /// Rows inserted or changed by the most recent successful sync
    pub recently_synced: i64,
    /// Completion time of the most recent successful sync, if any
    pub last_sync: Option<String>,
}

/// One row of the sync run audit trail
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SyncRunRecord {
    pub barangay: String,
    pub started_at: String,
    pub finished_at: String,
    /// "success" or "failure"
    pub status: String,
    pub synced: i64,
    pub errors: i64,
    pub message: Option<String>,
}

/// SQLite-backed store for crop records and sync runs
#[derive(Clone)]
pub struct CropStore {
    pool: SqlitePool,
}

impl CropStore {
    /// Create a store over an existing connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the given SQLite URL and initialize the schema
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(url).await?;
        let store = Self::new(pool);
        store.init_database().await?;
        Ok(store)
    }

    /// Connect to an in-memory database (single connection, for tests and
    /// the `check` command)
    pub async fn connect_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool);
        store.init_database().await?;
        Ok(store)
    }

    /// Access the underlying pool (integration tests)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Database reachability probe
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Initialize database tables
    pub async fn init_database(&self) -> Result<()> {
        debug!("Init crop record tables");

        // Crop records, keyed by their spreadsheet identity. Payload fields
        // may change between syncs; the key fields may not.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS crop_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                barangay TEXT NOT NULL,
                name TEXT NOT NULL,
                place TEXT NOT NULL DEFAULT '',
                crop TEXT NOT NULL,
                planting_date TEXT NOT NULL DEFAULT '',
                harvest_date TEXT NOT NULL DEFAULT '',
                total_area TEXT NOT NULL DEFAULT '',
                total_yield TEXT NOT NULL DEFAULT '',
                synced_at TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(barangay, name, crop, planting_date)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_crop_barangay ON crop_records(barangay)",
        )
        .execute(&self.pool)
        .await?;

        // Sync run audit trail; recently_synced/last_sync derive from here
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sync_runs (
                run_id INTEGER PRIMARY KEY AUTOINCREMENT,
                barangay TEXT NOT NULL,
                started_at TEXT NOT NULL,
                finished_at TEXT NOT NULL,
                status TEXT NOT NULL CHECK(status IN ('success', 'failure')),
                synced INTEGER NOT NULL DEFAULT 0,
                errors INTEGER NOT NULL DEFAULT 0,
                message TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_runs_barangay ON sync_runs(barangay, run_id)",
        )
        .execute(&self.pool)
        .await?;

        debug!("Crop record tables ready");
        Ok(())
    }

    /// Apply one barangay's sheet rows in a single transaction
    ///
    /// Upserts by the natural key (barangay, name, crop, planting_date).
    /// Unchanged rows are left untouched (the upsert's WHERE clause compares
    /// payload fields), which is what keeps repeated syncs idempotent.
    /// Returns the number of rows inserted or actually changed.
    ///
    /// The transaction is the region's commit boundary: any storage error
    /// rolls back this barangay only.
    pub async fn apply_rows(
        &self,
        barangay: &str,
        rows: &[SheetRow],
        stamp: &str,
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut synced: u64 = 0;

        for row in rows {
            let result = sqlx::query(
                r#"
                INSERT INTO crop_records
                (barangay, name, place, crop, planting_date, harvest_date,
                 total_area, total_yield, synced_at, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(barangay, name, crop, planting_date) DO UPDATE SET
                    place = excluded.place,
                    harvest_date = excluded.harvest_date,
                    total_area = excluded.total_area,
                    total_yield = excluded.total_yield,
                    synced_at = excluded.synced_at
                WHERE place != excluded.place
                   OR harvest_date != excluded.harvest_date
                   OR total_area != excluded.total_area
                   OR total_yield != excluded.total_yield
                "#,
            )
            .bind(barangay)
            .bind(&row.name)
            .bind(&row.place)
            .bind(&row.crop)
            .bind(&row.planting_date)
            .bind(&row.harvest_date)
            .bind(&row.total_area)
            .bind(&row.total_yield)
            .bind(stamp)
            .bind(stamp)
            .execute(&mut *tx)
            .await?;

            synced += result.rows_affected();
        }

        tx.commit().await?;
        Ok(synced)
    }

    /// Record one sync attempt in the audit trail
    pub async fn record_run(&self, run: &SyncRunRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sync_runs
            (barangay, started_at, finished_at, status, synced, errors, message)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&run.barangay)
        .bind(&run.started_at)
        .bind(&run.finished_at)
        .bind(&run.status)
        .bind(run.synced)
        .bind(run.errors)
        .bind(&run.message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Latest successful sync run for a barangay, if any
    pub async fn latest_successful_run(&self, barangay: &str) -> Result<Option<SyncRunRecord>> {
        let run = sqlx::query_as::<_, SyncRunRecord>(
            r#"
            SELECT barangay, started_at, finished_at, status, synced, errors, message
            FROM sync_runs
            WHERE barangay = ? AND status = 'success'
            ORDER BY run_id DESC
            LIMIT 1
            "#,
        )
        .bind(barangay)
        .fetch_optional(&self.pool)
        .await?;
        Ok(run)
    }

    /// All records of one barangay in insertion order
    pub async fn records(&self, barangay: &str) -> Result<Vec<CropRecord>> {
        let records = sqlx::query_as::<_, CropRecord>(
            r#"
            SELECT id, barangay, name, place, crop, planting_date, harvest_date,
                   total_area, total_yield, synced_at, created_at
            FROM crop_records
            WHERE barangay = ?
            ORDER BY id
            "#,
        )
        .bind(barangay)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Record count for one barangay
    pub async fn total_records(&self, barangay: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM crop_records WHERE barangay = ?")
                .bind(barangay)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Statistics for one barangay, derived from committed state
    pub async fn region_statistics(&self, barangay: &str) -> Result<RegionStatistics> {
        let total_records = self.total_records(barangay).await?;
        let (recently_synced, last_sync) = match self.latest_successful_run(barangay).await? {
            Some(run) => (run.synced, Some(run.finished_at)),
            None => (0, None),
        };

        Ok(RegionStatistics {
            total_records,
            recently_synced,
            last_sync,
        })
    }

    /// Statistics for every given barangay
    pub async fn statistics(
        &self,
        barangays: &[String],
    ) -> Result<BTreeMap<String, RegionStatistics>> {
        let mut stats = BTreeMap::new();
        for barangay in barangays {
            stats.insert(barangay.clone(), self.region_statistics(barangay).await?);
        }
        Ok(stats)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn sample_row(name: &str, crop: &str) -> SheetRow {
        SheetRow {
            name: name.to_string(),
            place: "Sitio Uno".to_string(),
            crop: crop.to_string(),
            planting_date: "2026-01-15".to_string(),
            harvest_date: "2026-05-20".to_string(),
            total_area: "1.5".to_string(),
            total_yield: "3200".to_string(),
        }
    }

    async fn setup_store() -> CropStore {
        CropStore::connect_in_memory()
            .await
            .expect("Failed to create in-memory store")
    }

    #[tokio::test]
    async fn test_init_database_creates_tables() {
        let store = setup_store().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(store.pool())
        .await
        .unwrap();

        assert!(tables.contains(&"crop_records".to_string()));
        assert!(tables.contains(&"sync_runs".to_string()));
    }

    #[tokio::test]
    async fn test_apply_rows_inserts_and_counts() {
        let store = setup_store().await;
        let rows = vec![sample_row("Juan Reyes", "Rice"), sample_row("Ana Cruz", "Corn")];

        let synced = store
            .apply_rows("Poblacion", &rows, "2026-08-06T00:00:00Z")
            .await
            .unwrap();

        assert_eq!(synced, 2);
        assert_eq!(store.total_records("Poblacion").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_apply_rows_is_idempotent() {
        let store = setup_store().await;
        let rows = vec![sample_row("Juan Reyes", "Rice")];

        let first = store
            .apply_rows("Poblacion", &rows, "2026-08-06T00:00:00Z")
            .await
            .unwrap();
        let second = store
            .apply_rows("Poblacion", &rows, "2026-08-06T01:00:00Z")
            .await
            .unwrap();

        assert_eq!(first, 1);
        // Unchanged payload: nothing touched on the second pass
        assert_eq!(second, 0);
        assert_eq!(store.total_records("Poblacion").await.unwrap(), 1);

        // synced_at still carries the first stamp
        let records = store.records("Poblacion").await.unwrap();
        assert_eq!(records[0].synced_at, "2026-08-06T00:00:00Z");
    }

    #[tokio::test]
    async fn test_apply_rows_updates_changed_payload() {
        let store = setup_store().await;
        let rows = vec![sample_row("Juan Reyes", "Rice")];
        store
            .apply_rows("Poblacion", &rows, "2026-08-06T00:00:00Z")
            .await
            .unwrap();

        let mut changed = sample_row("Juan Reyes", "Rice");
        changed.total_yield = "4100".to_string();
        let synced = store
            .apply_rows("Poblacion", &[changed], "2026-08-06T02:00:00Z")
            .await
            .unwrap();

        assert_eq!(synced, 1);
        let records = store.records("Poblacion").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_yield, "4100");
        assert_eq!(records[0].synced_at, "2026-08-06T02:00:00Z");
        // created_at keeps the original stamp and the id is stable
        assert_eq!(records[0].created_at, "2026-08-06T00:00:00Z");
    }

    #[tokio::test]
    async fn test_records_scoped_by_barangay_in_insertion_order() {
        let store = setup_store().await;
        store
            .apply_rows("Poblacion", &[sample_row("Juan Reyes", "Rice")], "t1")
            .await
            .unwrap();
        store
            .apply_rows("San Isidro", &[sample_row("Lito Santos", "Banana")], "t1")
            .await
            .unwrap();
        store
            .apply_rows("Poblacion", &[sample_row("Ana Cruz", "Corn")], "t2")
            .await
            .unwrap();

        let records = store.records("Poblacion").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Juan Reyes");
        assert_eq!(records[1].name, "Ana Cruz");
        assert!(records[0].id < records[1].id);
    }

    #[tokio::test]
    async fn test_statistics_derive_from_runs() {
        let store = setup_store().await;
        store
            .apply_rows("Poblacion", &[sample_row("Juan Reyes", "Rice")], "t1")
            .await
            .unwrap();
        store
            .record_run(&SyncRunRecord {
                barangay: "Poblacion".to_string(),
                started_at: "t1".to_string(),
                finished_at: "t1-end".to_string(),
                status: "success".to_string(),
                synced: 1,
                errors: 0,
                message: None,
            })
            .await
            .unwrap();

        let stats = store.region_statistics("Poblacion").await.unwrap();
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.recently_synced, 1);
        assert_eq!(stats.last_sync.as_deref(), Some("t1-end"));

        // A barangay that never synced reports zeros and no timestamp
        let empty = store.region_statistics("San Isidro").await.unwrap();
        assert_eq!(empty.total_records, 0);
        assert_eq!(empty.recently_synced, 0);
        assert!(empty.last_sync.is_none());
    }

    #[tokio::test]
    async fn test_failed_runs_do_not_move_statistics() {
        let store = setup_store().await;
        store
            .record_run(&SyncRunRecord {
                barangay: "Poblacion".to_string(),
                started_at: "t1".to_string(),
                finished_at: "t1-end".to_string(),
                status: "success".to_string(),
                synced: 3,
                errors: 0,
                message: None,
            })
            .await
            .unwrap();
        store
            .record_run(&SyncRunRecord {
                barangay: "Poblacion".to_string(),
                started_at: "t2".to_string(),
                finished_at: "t2-end".to_string(),
                status: "failure".to_string(),
                synced: 0,
                errors: 0,
                message: Some("sheet not found".to_string()),
            })
            .await
            .unwrap();

        let stats = store.region_statistics("Poblacion").await.unwrap();
        assert_eq!(stats.recently_synced, 3);
        assert_eq!(stats.last_sync.as_deref(), Some("t1-end"));
    }
}
