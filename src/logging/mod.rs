//! Logging and observability
//!
//! Structured logging through `tracing`: a console layer plus an optional
//! JSON file layer with rotation. The macros below keep the field names of
//! per-window events consistent across the pipeline.
//!
//! # Example
//!
//! ```no_run
//! use hourglass::logging::init_logging;
//! use hourglass::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(table = "events", "Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of one window
///
/// # Example
///
/// ```
/// use hourglass::core::state::ExportMarker;
/// use hourglass::domain::{BucketName, TableName};
/// use hourglass::log_window_start;
///
/// let marker = ExportMarker::new(
///     BucketName::new("archive").unwrap(),
///     TableName::new("events").unwrap(),
///     2023, 6, 15, 9,
/// ).unwrap();
/// log_window_start!(&marker);
/// ```
#[macro_export]
macro_rules! log_window_start {
    ($marker:expr) => {
        tracing::info!(
            bucket = %$marker.bucket(),
            table = %$marker.table_name(),
            path = %$marker.full_path(),
            window_start = %$marker.time(),
            "Processing window"
        );
    };
}

/// Log the completion of one window
///
/// # Example
///
/// ```
/// use hourglass::core::state::ExportMarker;
/// use hourglass::domain::{BucketName, TableName};
/// use hourglass::log_window_complete;
/// use std::time::Duration;
///
/// let marker = ExportMarker::new(
///     BucketName::new("archive").unwrap(),
///     TableName::new("events").unwrap(),
///     2023, 6, 15, 9,
/// ).unwrap();
/// log_window_complete!(&marker, 42, Duration::from_millis(350));
/// ```
#[macro_export]
macro_rules! log_window_complete {
    ($marker:expr, $records:expr, $duration:expr) => {
        tracing::info!(
            bucket = %$marker.bucket(),
            table = %$marker.table_name(),
            window_start = %$marker.time(),
            records = $records,
            duration_ms = $duration.as_millis() as u64,
            "Window complete"
        );
    };
}
