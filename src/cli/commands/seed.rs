//! Seed command implementation
//!
//! Inserts a table's first marker row, either at an explicit hour or at the
//! hour after the latest object found in storage. Existing rows are never
//! overwritten.

use crate::adapters::database::create_warehouse_and_markers;
use crate::adapters::storage::create_object_storage;
use crate::config::load_config;
use crate::config::schema::HourglassConfig;
use crate::core::state::{ExportMarker, HierarchyLocator, MarkerStore};
use crate::domain::window::TimeWindow;
use crate::domain::{HourglassError, Result};
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args};

/// Arguments for the seed command
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("origin").required(true).args(["from_storage", "start"])))]
pub struct SeedArgs {
    /// Table to seed
    #[arg(short, long)]
    pub table: String,

    /// Start after the latest exported object in the bucket
    #[arg(long)]
    pub from_storage: bool,

    /// First hour to export, RFC 3339 (e.g. 2023-06-15T09:00:00Z)
    #[arg(long, value_name = "RFC3339")]
    pub start: Option<String>,
}

impl SeedArgs {
    /// Execute the seed command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        match self.seed(&config).await {
            Ok(marker) => {
                println!(
                    "✅ Seeded {} at {}",
                    marker.table_name(),
                    marker.time().format("%Y-%m-%dT%H:00Z")
                );
                println!("   First object: {}", marker.object_url());
                Ok(0)
            }
            Err(e) => {
                tracing::error!(table = %self.table, error = %e, "Seed failed");
                println!("❌ Failed to seed {}", self.table);
                println!("   Error: {e}");
                Ok(e.exit_code())
            }
        }
    }

    async fn seed(&self, config: &HourglassConfig) -> Result<ExportMarker> {
        let table = config
            .table(&self.table)
            .ok_or_else(|| {
                HourglassError::Validation(format!("Table '{}' is not configured", self.table))
            })?
            .name
            .clone();
        let bucket = config.storage.bucket.clone();

        let marker = match &self.start {
            Some(start) => ExportMarker::from_time(bucket, table, parse_start(start)?)?,
            None => {
                let storage = create_object_storage(&config.storage)?;
                let latest = HierarchyLocator::new(storage)
                    .locate_latest(&bucket, &table)
                    .await?
                    .ok_or_else(|| {
                        HourglassError::Validation(format!(
                            "No exports found under s3://{bucket}/{table}/; use --start"
                        ))
                    })?;
                latest.next()?
            }
        };

        let (_, markers) = create_warehouse_and_markers(config)?;
        let store = MarkerStore::new_with_storage(markers);
        store.ensure_table().await?;
        store.seed(&marker).await?;

        tracing::info!(marker = %marker, "Seeded marker");
        Ok(marker)
    }
}

/// Parse an RFC 3339 instant that falls on an hour boundary
fn parse_start(raw: &str) -> Result<DateTime<Utc>> {
    let instant = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| HourglassError::Validation(format!("Invalid --start '{raw}': {e}")))?
        .with_timezone(&Utc);
    Ok(TimeWindow::starting_at(instant)?.from())
}
