//! Run summary and reporting

use crate::core::state::marker::ExportMarker;
use crate::domain::errors::HourglassError;
use std::time::Duration;

/// Summary of one pipeline run across all selected tables
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of tables attempted
    pub tables_processed: usize,

    /// Windows exported, imported and advanced past
    pub windows_processed: usize,

    /// Records written across all windows
    pub records_exported: usize,

    /// Bytes uploaded across all windows
    pub bytes_uploaded: u64,

    /// Warehouse rows deleted ahead of reloads
    pub rows_deleted: u64,

    /// Per-table outcome, in processing order
    pub tables: Vec<TableOutcome>,

    /// Errors encountered, at most one per table
    pub errors: Vec<RunError>,

    /// Wall time of the run
    pub duration: Duration,

    /// The run stopped early on a shutdown signal
    pub interrupted: bool,

    /// Nothing was written
    pub dry_run: bool,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a completed window
    pub fn record_window(&mut self, records: usize, bytes: u64, rows_deleted: u64) {
        self.windows_processed += 1;
        self.records_exported += records;
        self.bytes_uploaded += bytes;
        self.rows_deleted += rows_deleted;
    }

    /// Add an error
    pub fn add_error(&mut self, error: RunError) {
        self.errors.push(error);
    }

    /// No table failed
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            tables = self.tables_processed,
            windows = self.windows_processed,
            records = self.records_exported,
            bytes = self.bytes_uploaded,
            rows_deleted = self.rows_deleted,
            duration_secs = self.duration.as_secs(),
            interrupted = self.interrupted,
            dry_run = self.dry_run,
            "Run completed"
        );

        for table in &self.tables {
            tracing::info!(
                table = %table.table,
                windows = table.windows_processed,
                next = table.next_marker.as_ref().map(|m| m.to_string()).unwrap_or_default(),
                "Table outcome"
            );
        }

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Run completed with errors");
            for error in &self.errors {
                tracing::warn!(
                    table = %error.table,
                    error_type = %error.error_type,
                    window = error.window.as_deref().unwrap_or("-"),
                    message = %error.message,
                    "Run error"
                );
            }
        }
    }
}

/// What happened to one table during a run
#[derive(Debug, Clone)]
pub struct TableOutcome {
    pub table: String,
    pub windows_processed: usize,
    /// Marker the next run will start from, if known
    pub next_marker: Option<ExportMarker>,
}

/// A failure with the table and window it happened in
#[derive(Debug, Clone)]
pub struct RunError {
    pub table: String,
    /// Window start, `YYYY-MM-DDTHH`, if the failure concerned one window
    pub window: Option<String>,
    /// Short label from [`HourglassError::kind`]
    pub error_type: &'static str,
    pub message: String,
}

impl RunError {
    pub fn from_error(
        table: impl Into<String>,
        window: Option<&ExportMarker>,
        error: &HourglassError,
    ) -> Self {
        Self {
            table: table.into(),
            window: window.map(|m| m.time().format("%Y-%m-%dT%H").to_string()),
            error_type: error.kind(),
            message: error.to_string(),
        }
    }
}
