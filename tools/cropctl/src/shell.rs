//! Interactive browsing shell
//!
//! A small REPL over the sync service that keeps its session state in the
//! ViewState reducer: region selection, region-scoped filter, loading gate
//! and stale-response protection all live there, not in the command loop.

use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use crate::client::{ClientError, SyncClient};
use crate::config::ReadFailurePolicy;
use crate::output::{print_records, print_statistics, print_sync_result};
use crate::state::{Action, ViewMode, ViewState};

pub struct ShellSession {
    client: SyncClient,
    state: ViewState,
    policy: ReadFailurePolicy,
}

impl ShellSession {
    pub fn new(client: SyncClient, policy: ReadFailurePolicy) -> Self {
        Self {
            client,
            state: ViewState::new(),
            policy,
        }
    }

    /// Run the interactive loop
    pub async fn run(&mut self) -> Result<()> {
        println!("cropctl shell - type 'help' for commands, 'quit' to exit");
        let mut editor = DefaultEditor::new().context("Failed to initialize readline")?;

        // Initial statistics load so 'regions' works right away
        self.refresh_statistics().await;

        loop {
            match editor.readline("cropctl> ") {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(&line);
                    if !self.handle_line(&line).await {
                        break;
                    }
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("readline error: {}", e);
                    break;
                },
            }
        }

        Ok(())
    }

    /// Dispatch one command line; false ends the loop
    async fn handle_line(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let command = parts.next().unwrap_or_default();
        let argument = parts.next().map(str::trim).unwrap_or_default();

        match command {
            "help" => print_help(),
            "quit" | "exit" => return false,
            "regions" => {
                for barangay in self.state.statistics.keys() {
                    println!("  {}", barangay);
                }
            },
            "stats" => {
                self.state.apply(Action::SetMode(ViewMode::Statistics));
                self.refresh_statistics().await;
                print_statistics(&self.state.statistics);
            },
            "use" => {
                if argument.is_empty() {
                    println!("usage: use <barangay>");
                } else {
                    self.state.apply(Action::SetMode(ViewMode::Data));
                    self.state.apply(Action::SelectRegion(argument.to_string()));
                    self.fetch_records(argument).await;
                    self.print_current_records();
                }
            },
            "filter" => {
                if self.state.region.is_none() {
                    println!("select a region first: use <barangay>");
                } else {
                    self.state.apply(Action::SetFilter(argument.to_string()));
                    self.print_current_records();
                }
            },
            "sync" => self.run_sync(argument).await,
            other => println!("unknown command '{}'; try 'help'", other),
        }

        true
    }

    /// Trigger a sync (all regions, or one), then refresh views
    async fn run_sync(&mut self, barangay: &str) {
        if !self.state.begin_sync() {
            println!("a sync is already in flight");
            return;
        }

        let result = if barangay.is_empty() {
            self.client.sync_all().await
        } else {
            self.client.sync_one(barangay).await
        };

        match result {
            Ok(result) => {
                print_sync_result(&result);
                let synced_region = if barangay.is_empty() {
                    None
                } else {
                    Some(barangay)
                };
                let wants_records = self.state.wants_record_refresh(synced_region);
                self.state.apply(Action::SyncFinished(result));

                // Statistics always refresh after a sync; the record list
                // only when the viewed region was part of it
                self.refresh_statistics().await;
                if wants_records {
                    if let Some(region) = self.state.region.clone() {
                        self.fetch_records(&region).await;
                        self.print_current_records();
                    }
                }
            },
            Err(e) => {
                self.state
                    .apply(Action::SyncFinished(syncsrv::sync::SyncResult::failure(
                        e.to_string(),
                    )));
                eprintln!("{} {}", "✗".red().bold(), e);
            },
        }
    }

    /// Soft-failing statistics refresh
    async fn refresh_statistics(&mut self) {
        let token = self.state.begin_statistics_fetch();
        match self.client.fetch_statistics().await {
            Ok(statistics) => {
                self.state
                    .apply(Action::StatisticsLoaded { token, statistics });
            },
            Err(e) => {
                self.state.apply(Action::StatisticsFailed { token });
                self.report_read_failure("statistics", &e);
            },
        }
    }

    /// Soft-failing record fetch for one region
    async fn fetch_records(&mut self, region: &str) {
        let token = self.state.begin_record_fetch(region);
        match self.client.fetch_records(region).await {
            Ok(records) => {
                self.state.apply(Action::RecordsLoaded {
                    region: region.to_string(),
                    token,
                    records,
                });
            },
            Err(e) => {
                self.state.apply(Action::RecordsFailed {
                    region: region.to_string(),
                    token,
                });
                self.report_read_failure("records", &e);
            },
        }
    }

    fn print_current_records(&self) {
        if let Some(region) = &self.state.region {
            print_records(region, &self.state.visible_records(), &self.state.filter);
        }
    }

    fn report_read_failure(&self, what: &str, error: &ClientError) {
        match self.policy {
            ReadFailurePolicy::Surface => eprintln!("{} fetch failed: {}", what, error),
            ReadFailurePolicy::Suppress => {
                debug!("{} fetch failed (suppressed): {}", what, error)
            },
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  stats              show per-barangay sync statistics");
    println!("  regions            list known barangays");
    println!("  use <barangay>     select a barangay and load its records");
    println!("  filter <text>      filter the record view (empty to clear)");
    println!("  sync [barangay]    sync all barangays, or just one");
    println!("  quit               leave the shell");
}
