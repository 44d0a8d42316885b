//! Terminal rendering for statistics, records and sync reports

use std::collections::BTreeMap;

use colored::Colorize;

use syncsrv::store::{CropRecord, RegionStatistics};
use syncsrv::sync::{SyncDetail, SyncResult};

use crate::filter::highlight;

/// Print the per-barangay statistics table
pub fn print_statistics(statistics: &BTreeMap<String, RegionStatistics>) {
    println!("{}", "Sync statistics".bold());
    println!(
        "{:<20} {:>8} {:>10}  {}",
        "Barangay", "Records", "Recent", "Last sync"
    );
    for (barangay, stats) in statistics {
        println!(
            "{:<20} {:>8} {:>10}  {}",
            barangay,
            stats.total_records,
            stats.recently_synced,
            stats.last_sync.as_deref().unwrap_or("never").dimmed()
        );
    }
}

/// Print a record table; filter matches are highlighted
pub fn print_records(barangay: &str, records: &[&CropRecord], query: &str) {
    if records.is_empty() {
        println!("No records for {}", barangay.bold());
        return;
    }

    println!("{} ({} record(s))", barangay.bold(), records.len());
    println!(
        "{:<4} {:<20} {:<16} {:<12} {:<12} {:<12} {:>8} {:>8}",
        "#", "Farmer", "Location", "Crop", "Planted", "Harvested", "Area", "Yield"
    );
    for record in records {
        println!(
            "{:<4} {:<20} {:<16} {:<12} {:<12} {:<12} {:>8} {:>8}",
            record.id,
            highlight(&record.name, query),
            highlight(&record.place, query),
            highlight(&record.crop, query),
            highlight(&record.planting_date, query),
            highlight(&record.harvest_date, query),
            highlight(&record.total_area, query),
            highlight(&record.total_yield, query),
        );
    }
}

/// Print a sync result banner with the per-barangay breakdown
pub fn print_sync_result(result: &SyncResult) {
    if result.success {
        println!("{} {}", "✓".green().bold(), result.message);
    } else {
        println!("{} {}", "✗".red().bold(), result.message);
    }

    for detail in &result.details {
        match detail {
            SyncDetail::Success {
                barangay,
                synced,
                errors,
            } => {
                let line = format!("{}: {} synced, {} error(s)", barangay, synced, errors);
                if *errors > 0 {
                    println!("  {} {}", "✓".yellow(), line);
                } else {
                    println!("  {} {}", "✓".green(), line);
                }
            },
            SyncDetail::Failure { barangay, message } => {
                println!("  {} {}: {}", "✗".red(), barangay, message);
            },
        }
    }
}
