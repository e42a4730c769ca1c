// Hourglass - Hourly table export to S3 with warehouse reload
// Copyright (c) 2025 Hourglass Contributors
// Licensed under the MIT License

//! # Hourglass - hourly table archiving
//!
//! Hourglass exports the rows of source tables one UTC hour at a time into
//! pipe-delimited text objects in S3, reloads each hour into a warehouse, and
//! keeps a persisted marker per table so every run resumes where the last one
//! stopped.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Markers, export, import and the run pipeline
//! - [`adapters`] - PostgreSQL/Redshift and object storage
//! - [`domain`] - Errors, identifiers and time windows
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Object Layout
//!
//! Every hour of every table maps to exactly one key:
//!
//! ```rust
//! use hourglass::core::state::ExportMarker;
//! use hourglass::domain::{BucketName, TableName};
//!
//! let marker = ExportMarker::new(
//!     BucketName::new("archive").unwrap(),
//!     TableName::new("events").unwrap(),
//!     2023, 6, 15, 9,
//! ).unwrap();
//!
//! assert_eq!(marker.full_path(), "events/2023/06/15/events-2023061509.txt");
//! assert_eq!(marker.next().unwrap().full_path(), "events/2023/06/15/events-2023061510.txt");
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hourglass::config::load_config;
//! use hourglass::core::export::{PipelineCoordinator, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("hourglass.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = PipelineCoordinator::new(config, shutdown_rx).await?;
//!     let summary = coordinator.run(&RunOptions::at(chrono::Utc::now())).await?;
//!
//!     println!("Exported {} windows", summary.windows_processed);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type
//! [`domain::HourglassError`] also maps to the CLI's exit codes.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
