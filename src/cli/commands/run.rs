//! Run command implementation
//!
//! Processes every due window of the configured tables.

use crate::config::load_config;
use crate::core::export::{PipelineCoordinator, RunOptions, RunSummary};
use chrono::Utc;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Table to process (repeatable; default: every configured table)
    #[arg(short, long = "table", value_name = "TABLE")]
    pub tables: Vec<String>,

    /// Fetch and render windows without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Override the per-table window limit for this run
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_windows: Option<u64>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(e.exit_code());
            }
        };

        let options = self.options(config.application.dry_run);
        if options.dry_run {
            tracing::info!("Dry run mode enabled - nothing will be written");
            println!("🔍 DRY RUN MODE - No objects, warehouse rows or markers will be written");
            println!();
        }

        let coordinator = match PipelineCoordinator::new(config, shutdown_signal).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create pipeline coordinator");
                eprintln!("Failed to initialize run: {e}");
                return Ok(e.exit_code());
            }
        };

        println!("🚀 Starting run...");
        println!();

        let summary = match coordinator.run(&options).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Run failed");
                eprintln!("Run failed: {e}");
                return Ok(e.exit_code());
            }
        };

        print_summary(&summary);
        Ok(exit_code(&summary))
    }

    fn options(&self, config_dry_run: bool) -> RunOptions {
        RunOptions {
            tables: self.tables.clone(),
            max_windows: self.max_windows.map(|n| n as usize),
            dry_run: self.dry_run || config_dry_run,
            now: Utc::now(),
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 Run Summary:");
    println!("  Tables: {}", summary.tables_processed);
    println!("  Windows: {}", summary.windows_processed);
    println!("  Records: {}", summary.records_exported);
    println!("  Bytes Uploaded: {}", summary.bytes_uploaded);
    println!("  Rows Deleted: {}", summary.rows_deleted);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    for table in &summary.tables {
        let next = table
            .next_marker
            .as_ref()
            .map(|m| m.time().format("%Y-%m-%dT%H").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<30} windows: {:<5} next: {}",
            table.table, table.windows_processed, next
        );
    }
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - [{}] {}: {}", error.error_type, error.table, error.message);
            if let Some(window) = &error.window {
                println!("    Window: {window}");
            }
        }
        println!();
    }
}

/// 130 if interrupted, 1 if any table failed, else 0
fn exit_code(summary: &RunSummary) -> i32 {
    if summary.interrupted {
        println!("⚠️  Run interrupted between windows. Markers reflect completed windows.");
        println!("   Run the same command to resume.");
        tracing::info!("Run interrupted by user signal");
        130
    } else if summary.is_successful() {
        println!("✅ Run completed successfully!");
        0
    } else {
        println!("⚠️  Run completed with failures");
        1
    }
}
