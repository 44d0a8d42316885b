//! cropctl - CLI client for the crop record synchronization service
//!
//! Triggers sheet-to-database syncs and browses statistics and synced
//! records, either as one-shot commands or through an interactive shell.

mod client;
mod config;
mod filter;
mod output;
mod shell;
mod state;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::SyncClient;
use crate::config::ClientConfig;
use crate::filter::filter_records;
use crate::output::{print_records, print_statistics, print_sync_result};
use crate::shell::ShellSession;

#[derive(Parser)]
#[command(name = "cropctl")]
#[command(about = "cropctl - crop record sync client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (default: config/cropctl.yaml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Sync service base URL (overrides config)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// CSRF token for sync triggers (overrides config)
    #[arg(short, long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-barangay sync statistics
    Stats,

    /// List synced records of one barangay
    Records {
        /// Barangay name
        barangay: String,

        /// Case-insensitive substring filter across all fields
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Sync spreadsheet data into the database
    Sync {
        /// Barangay name (all barangays if not specified)
        barangay: Option<String>,
    },

    /// Interactive browsing shell
    Shell,

    /// Check service reachability
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity; suppressed read failures show up at debug
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(token) = cli.token {
        config.csrf_token = Some(token);
    }

    let client = SyncClient::new(config.server_url.clone(), config.csrf_token.clone());

    match cli.command {
        Commands::Stats => {
            let statistics = client.fetch_statistics().await?;
            print_statistics(&statistics);
        },

        Commands::Records { barangay, filter } => {
            let records = client.fetch_records(&barangay).await?;
            let query = filter.unwrap_or_default();
            let visible = filter_records(&records, &query);
            print_records(&barangay, &visible, &query);
        },

        Commands::Sync { barangay } => {
            let result = match &barangay {
                Some(barangay) => client.sync_one(barangay).await?,
                None => client.sync_all().await?,
            };
            print_sync_result(&result);

            // Statistics always refresh after a sync
            match client.fetch_statistics().await {
                Ok(statistics) => {
                    println!();
                    print_statistics(&statistics);
                },
                Err(e) => eprintln!("statistics refresh failed: {}", e),
            }

            if !result.success {
                bail!("sync finished with failures");
            }
        },

        Commands::Shell => {
            ShellSession::new(client, config.read_failure_policy)
                .run()
                .await?;
        },

        Commands::Check => {
            let health = client.fetch_health().await?;
            let status = health["data"]["status"].as_str().unwrap_or("unknown");
            let service = health["data"]["service"].as_str().unwrap_or("?");
            println!("{} @ {}: {}", service, config.server_url, status);
            if status != "healthy" {
                bail!("service is {}", status);
            }
        },
    }

    Ok(())
}
