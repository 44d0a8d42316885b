//! End-to-end sync flows: partial failure, idempotence, monotonic totals

#![allow(clippy::disallowed_methods)] // Integration test - unwrap is acceptable

mod common;

use axum::http::StatusCode;
use common::*;

const ROW_A: [&str; 5] = [
    "Juan Reyes,Sitio Uno,Rice,2026-01-15,2026-05-20,1.5,3200",
    "Ana Cruz,Sitio Dos,Corn,2026-02-01,,0.8,",
    "Lito Santos,Purok 3,Rice,2026-01-20,,1.2,",
    "Maria Lopez,Purok 3,Banana,2025-12-05,,2.4,",
    "Pedro Ramos,Sitio Uno,Cassava,2026-03-10,,0.5,",
];

const ROW_C: [&str; 2] = [
    "Elena Garcia,Centro,Wheat,2026-01-08,,1.1,",
    "Ramon Diaz,Centro,Rice,2026-01-09,,0.9,",
];

async fn sync_all(env: &TestEnv) -> serde_json::Value {
    let router = env.router();
    expect_json(
        post_with_token(
            &router,
            "/sync/sheets-to-database",
            Some(TEST_CSRF_TOKEN),
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await
}

async fn statistics(env: &TestEnv) -> serde_json::Value {
    let router = env.router();
    expect_json(get(&router, "/sync/statistics").await, StatusCode::OK).await
}

/// A gains rows, B's sheet disappears, C is unchanged. The failure is
/// isolated, the report is complete and ordered, and untouched regions
/// keep their statistics.
#[tokio::test]
async fn test_partial_failure_scenario() {
    let env = TestEnv::with_barangays(&["A", "B", "C"]).await;
    env.write_sheet("A", &ROW_A);
    env.write_sheet("B", &[]);
    env.write_sheet("C", &ROW_C);

    // Seed: A=5, B=0, C=2
    let seed = sync_all(&env).await;
    assert_eq!(seed["success"], true);
    let stats = statistics(&env).await;
    assert_eq!(stats["statistics"]["A"]["total_records"], 5);
    assert_eq!(stats["statistics"]["B"]["total_records"], 0);
    assert_eq!(stats["statistics"]["C"]["total_records"], 2);

    // A gains two rows, B's sheet goes missing, C unchanged
    let mut grown: Vec<&str> = ROW_A.to_vec();
    grown.push("Rosa Mendoza,Sitio Dos,Mango,2026-04-01,,0.7,");
    grown.push("Carlos Reyes,Purok 5,Rice,2026-04-02,,1.0,");
    env.write_sheet("A", &grown);
    env.remove_sheet("B");

    let result = sync_all(&env).await;

    assert_eq!(result["success"], false);
    let details = result["details"].as_array().unwrap();
    assert_eq!(details.len(), 3);

    assert_eq!(details[0]["barangay"], "A");
    assert_eq!(details[0]["status"], "success");
    assert_eq!(details[0]["synced"], 2);
    assert_eq!(details[0]["errors"], 0);

    assert_eq!(details[1]["barangay"], "B");
    assert_eq!(details[1]["status"], "failure");
    assert!(details[1]["message"]
        .as_str()
        .unwrap()
        .contains("Sheet not found"));

    assert_eq!(details[2]["barangay"], "C");
    assert_eq!(details[2]["status"], "success");
    assert_eq!(details[2]["synced"], 0);

    // A committed despite B's failure; B and C totals unchanged
    let stats = statistics(&env).await;
    assert_eq!(stats["statistics"]["A"]["total_records"], 7);
    assert_eq!(stats["statistics"]["A"]["recently_synced"], 2);
    assert_eq!(stats["statistics"]["B"]["total_records"], 0);
    assert_eq!(stats["statistics"]["C"]["total_records"], 2);
    assert_eq!(stats["statistics"]["C"]["recently_synced"], 0);
}

/// Re-running a sync over unchanged sheets converges: totals stay put and
/// recently_synced drops to zero.
#[tokio::test]
async fn test_sync_idempotence() {
    let env = TestEnv::with_barangays(&["A"]).await;
    env.write_sheet("A", &ROW_A);

    let first = sync_all(&env).await;
    assert_eq!(first["details"][0]["synced"], 5);
    let stats = statistics(&env).await;
    assert_eq!(stats["statistics"]["A"]["total_records"], 5);
    assert_eq!(stats["statistics"]["A"]["recently_synced"], 5);

    let second = sync_all(&env).await;
    assert_eq!(second["success"], true);
    assert_eq!(second["details"][0]["synced"], 0);

    let stats = statistics(&env).await;
    assert_eq!(stats["statistics"]["A"]["total_records"], 5);
    assert_eq!(stats["statistics"]["A"]["recently_synced"], 0);
}

/// A malformed row is counted per region without failing the sheet.
#[tokio::test]
async fn test_malformed_rows_counted_not_fatal() {
    let env = TestEnv::with_barangays(&["A"]).await;
    env.write_sheet(
        "A",
        &[
            "Juan Reyes,Sitio Uno,Rice,2026-01-15,,1.5,3200",
            ",Sitio Dos,Corn,2026-02-01,,0.8,", // missing farmer name
        ],
    );

    let result = sync_all(&env).await;

    assert_eq!(result["success"], true);
    assert_eq!(result["details"][0]["status"], "success");
    assert_eq!(result["details"][0]["synced"], 1);
    assert_eq!(result["details"][0]["errors"], 1);

    let stats = statistics(&env).await;
    assert_eq!(stats["statistics"]["A"]["total_records"], 1);
}

/// total_records never decreases across syncs, including failed ones.
#[tokio::test]
async fn test_totals_monotonic_across_syncs() {
    let env = TestEnv::with_barangays(&["A"]).await;
    env.write_sheet("A", &ROW_C);

    sync_all(&env).await;
    let before = statistics(&env).await["statistics"]["A"]["total_records"]
        .as_i64()
        .unwrap();

    // Failed sync: sheet removed
    env.remove_sheet("A");
    let failed = sync_all(&env).await;
    assert_eq!(failed["success"], false);

    let after = statistics(&env).await["statistics"]["A"]["total_records"]
        .as_i64()
        .unwrap();
    assert!(after >= before);
    assert_eq!(after, before);
}
