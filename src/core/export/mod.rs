//! Export of hourly windows and run orchestration
//!
//! - [`record`] - Row serialization to the delimited text format
//! - [`exporter`] - Rendering and uploading one window's object
//! - [`coordinator`] - The per-table, per-window pipeline
//! - [`summary`] - Run totals and errors

pub mod coordinator;
pub mod exporter;
pub mod record;
pub mod summary;

pub use coordinator::{PipelineCoordinator, PipelineParts, RunOptions};
pub use exporter::{render_records, ExportOutcome, Exporter};
pub use record::{DelimitedRow, TxtRecord};
pub use summary::{RunError, RunSummary, TableOutcome};
