//! Configuration management for Hourglass.
//!
//! Hourglass reads one TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `HOURGLASS_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! connection_string = "${HOURGLASS_SOURCE_URL}"
//!
//! [warehouse]
//! connection_string = "${HOURGLASS_WAREHOUSE_URL}"
//! markers_table = "import_markers"
//!
//! [storage]
//! bucket = "analytics-archive"
//! region = "us-east-1"
//! iam_role = "arn:aws:iam::123456789012:role/redshift-loader"
//!
//! [state]
//! bootstrap_from_storage = true
//! settle_minutes = 5
//!
//! [import]
//! delete_bounds = "half_open"
//!
//! [[tables]]
//! name = "events"
//! time_column = "created_at"
//! columns = ["id", "kind", "payload", "created_at"]
//! max_windows = 24
//! ```
//!
//! # Sections
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`PostgreSQLConfig`] - source database connection
//! - [`WarehouseConfig`] - warehouse connection and marker table
//! - [`StorageConfig`] - bucket, region, endpoint, COPY role
//! - [`StateConfig`] - marker bootstrap and settle delay
//! - [`ImportConfig`] - delete bounds
//! - [`TableConfig`] - one exported table
//! - [`LoggingConfig`] - file logging

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, HourglassConfig, ImportConfig, LoggingConfig, PostgreSQLConfig,
    StateConfig, StorageConfig, TableConfig, WarehouseConfig,
};
pub use secret::{redact_credentials, secret_string, SecretString, SecretValue};
