//! Core pipeline logic for Hourglass.
//!
//! # Modules
//!
//! - [`state`] - Export markers, their persistence and reconstruction from storage
//! - [`export`] - Writing windows to object storage and orchestrating runs
//! - [`import`] - Reloading windows into the warehouse
//!
//! # Run Workflow
//!
//! For each table, while the marker's window is due:
//!
//! 1. **Fetch**: Select the window's rows from the source table
//! 2. **Export**: Write them to `{table}/{YYYY}/{MM}/{DD}/{table}-{YYYYMMDDHH}.txt`
//! 3. **Verify**: Compare the stored object size with the uploaded body
//! 4. **Import**: Delete the window from the warehouse, then bulk load the object
//! 5. **Advance**: Move the marker one hour forward, failing if it moved underneath us
//!
//! # Example
//!
//! ```rust,no_run
//! use hourglass::config::load_config;
//! use hourglass::core::export::{PipelineCoordinator, RunOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("hourglass.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = PipelineCoordinator::new(config, shutdown_rx).await?;
//! let summary = coordinator.run(&RunOptions::at(chrono::Utc::now())).await?;
//!
//! println!("Windows: {}", summary.windows_processed);
//! println!("Records: {}", summary.records_exported);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod import;
pub mod state;
