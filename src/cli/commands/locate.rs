//! Locate command implementation
//!
//! Reconstructs a table's latest exported hour from the bucket hierarchy,
//! without consulting the marker table.

use crate::adapters::storage::create_object_storage;
use crate::config::load_config;
use crate::core::state::HierarchyLocator;
use crate::domain::ids::TableName;
use clap::Args;

/// Arguments for the locate command
#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Table whose key prefix is searched
    #[arg(short, long)]
    pub table: String,
}

impl LocateArgs {
    /// Execute the locate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let table = match TableName::new(self.table.as_str()) {
            Ok(t) => t,
            Err(e) => {
                println!("❌ {e}");
                return Ok(2);
            }
        };

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        let storage = match create_object_storage(&config.storage) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to create object storage client");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        tracing::info!(bucket = %config.storage.bucket, table = %table, "Locating latest export");
        let located = match HierarchyLocator::new(storage)
            .locate_latest(&config.storage.bucket, &table)
            .await
        {
            Ok(m) => m,
            Err(e) => {
                println!("❌ Failed to walk s3://{}/{}/", config.storage.bucket, table);
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        match located {
            Some(latest) => {
                println!("📍 Latest export for {table}:");
                println!("  Hour:   {}", latest.time().format("%Y-%m-%dT%H:00Z"));
                println!("  Object: {}", latest.object_url());
                match latest.next() {
                    Ok(next) => println!("  Next:   {}", next.time().format("%Y-%m-%dT%H:00Z")),
                    Err(e) => println!("  Next:   - ({e})"),
                }
            }
            None => {
                println!("No exports found under s3://{}/{}/", config.storage.bucket, table);
            }
        }
        Ok(0)
    }
}
