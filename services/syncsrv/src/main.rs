//! SyncSrv main program
//!
//! Service startup and command line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use syncsrv::app_state::AppState;
use syncsrv::config::SyncSrvConfig;
use syncsrv::error::{Result, SyncSrvError};
use syncsrv::routes::create_routes;
use syncsrv::sheets::CsvSheetSource;
use syncsrv::store::CropStore;
use syncsrv::sync::SyncEngine;

#[derive(Parser, Debug)]
#[command(author, version, about = "SyncSrv - crop record synchronization service")]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check configuration and environment
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration: flag > CONFIG_FILE env > default path > defaults
    let config = if let Some(config_path) = args.config {
        SyncSrvConfig::from_file(config_path)?
    } else {
        SyncSrvConfig::load()?
    };

    config.validate()?;

    // Initialize logging
    common::logging::init_with_config(common::logging::LogConfig {
        service_name: config.service.name.clone(),
        log_dir: PathBuf::from(&config.log.dir),
        level: config.log.level.clone(),
        ..Default::default()
    })
    .map_err(|e| SyncSrvError::config(format!("Failed to initialize logging: {}", e)))?;

    match args.command {
        Some(Commands::Check) => check_config(config).await,
        None => run_service(config).await,
    }
}

/// Run service mode
async fn run_service(config: SyncSrvConfig) -> Result<()> {
    info!("Starting SyncSrv v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configured barangays: {}",
        config.barangays.join(", ")
    );

    ensure_database_dir(&config)?;
    let store = CropStore::connect(&config.database_url()).await?;
    info!("Store ready: {}", config.database.path);

    let source = Arc::new(CsvSheetSource::new(&config.sheets.dir));
    let engine = SyncEngine::new(store.clone(), source, config.barangays.clone());

    let config = Arc::new(config);
    let state = Arc::new(AppState::new(config.clone(), store, engine));
    let app = create_routes(state);

    let addr = format!("{}:{}", config.api.host, config.api.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("SyncSrv listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| SyncSrvError::internal(format!("API server error: {}", e)))?;

    Ok(())
}

/// Check configuration and environment
async fn check_config(config: SyncSrvConfig) -> Result<()> {
    println!("=== SyncSrv configuration check ===\n");

    // 1. Validate configuration (already done in main, repeat for the report)
    match config.validate() {
        Ok(_) => println!("✓ Configuration valid"),
        Err(e) => {
            println!("✗ Configuration invalid: {}", e);
            return Err(e);
        },
    }

    // 2. Show service configuration
    println!("\n--- Service ---");
    println!("Name: {}", config.service.name);
    if let Some(description) = &config.service.description {
        println!("Description: {}", description);
    }
    println!("API address: http://{}:{}", config.api.host, config.api.port);
    println!("Log level: {}", config.log.level);

    // 3. Show and probe the sheet directory
    println!("\n--- Sheets ---");
    println!("Directory: {}", config.sheets.dir);
    let source = CsvSheetSource::new(&config.sheets.dir);
    for barangay in &config.barangays {
        let path = source.sheet_path(barangay);
        let marker = if path.exists() { "✓" } else { "✗" };
        println!("  {} {} -> {}", marker, barangay, path.display());
    }

    // 4. Probe the database
    println!("\n--- Database ---");
    println!("Path: {}", config.database.path);
    ensure_database_dir(&config)?;
    print!("Connection test: ");
    match CropStore::connect(&config.database_url()).await {
        Ok(store) => {
            println!("✓ ok");
            for barangay in &config.barangays {
                let total = store.total_records(barangay).await?;
                println!("  {} record(s) in {}", total, barangay);
            }
        },
        Err(e) => {
            println!("✗ failed - {}", e);
            return Err(e);
        },
    }

    println!("\n✓ All checks passed");
    Ok(())
}

/// Create the database directory if the configured path needs one
fn ensure_database_dir(config: &SyncSrvConfig) -> Result<()> {
    if config.database.path != ":memory:" {
        if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}
