//! Status command implementation
//!
//! Shows each configured table's persisted marker and whether its window is
//! due.

use crate::adapters::database::create_warehouse_and_markers;
use crate::config::load_config;
use crate::config::schema::HourglassConfig;
use crate::core::state::{ExportMarker, MarkerStore};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Filter by table
    #[arg(short, long)]
    pub table: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// One line of status output
#[derive(Debug, Clone, Serialize)]
pub struct TableStatus {
    pub table: String,
    /// Persisted marker, `None` if the table was never seeded
    pub marker: Option<ExportMarker>,
    /// Window the next run would process
    pub next_window: Option<String>,
    /// Whether that window is closed and settled
    pub due: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking marker status");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        if let Some(ref table) = self.table {
            if config.table(table).is_none() {
                println!("❌ Table '{table}' is not configured");
                return Ok(2);
            }
        }

        let markers = match create_warehouse_and_markers(&config) {
            Ok((_, markers)) => markers,
            Err(e) => {
                println!("❌ Failed to connect to warehouse");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        let persisted = match MarkerStore::new_with_storage(markers)
            .list(&config.storage.bucket)
            .await
        {
            Ok(m) => m,
            Err(e) => {
                println!("❌ Failed to load markers");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        let rows = self.collect(&config, persisted, Utc::now());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(0);
        }

        println!("📊 Marker Status (bucket: {})", config.storage.bucket);
        println!();
        println!("{:<30} {:<16} {:<48} {:<5}", "Table", "Marker", "Next Window", "Due");
        println!("{}", "-".repeat(102));
        for row in &rows {
            let marker = row
                .marker
                .as_ref()
                .map(|m| m.time().format("%Y-%m-%dT%H").to_string())
                .unwrap_or_else(|| "not seeded".to_string());
            println!(
                "{:<30} {:<16} {:<48} {:<5}",
                row.table,
                marker,
                row.next_window.as_deref().unwrap_or("-"),
                if row.due { "yes" } else { "no" }
            );
        }
        println!();
        Ok(0)
    }

    fn collect(
        &self,
        config: &HourglassConfig,
        persisted: Vec<ExportMarker>,
        now: DateTime<Utc>,
    ) -> Vec<TableStatus> {
        let settle = chrono::Duration::minutes(config.state.settle_minutes as i64);
        config
            .tables
            .iter()
            .filter(|t| self.table.as_deref().map_or(true, |name| t.name.as_str() == name))
            .map(|t| {
                let marker = persisted.iter().find(|m| m.table_name() == &t.name).cloned();
                let window = marker.as_ref().map(|m| m.window());
                TableStatus {
                    table: t.name.to_string(),
                    next_window: window.map(|w| w.to_string()),
                    due: window.is_some_and(|w| w.is_closed_at(now, settle)),
                    marker,
                }
            })
            .collect()
    }
}
