//! Pipeline coordinator - main orchestrator for a run
//!
//! For every selected table the coordinator walks forward from the persisted
//! marker, one hour at a time: fetch the window's source rows, export them to
//! the window's object, verify the upload, reload the window into the
//! warehouse and advance the marker. A table stops at its first error; the
//! run continues with the next table.

use crate::adapters::database::traits::{
    MarkerStorage, SourceClient, SourceQuery, WarehouseClient,
};
use crate::adapters::database::{create_source_client, create_warehouse_and_markers};
use crate::adapters::storage::{create_object_storage, ObjectStorage};
use crate::config::schema::{HourglassConfig, TableConfig};
use crate::core::export::exporter::{render_records, Exporter};
use crate::core::export::summary::{RunError, RunSummary, TableOutcome};
use crate::core::import::{ImportTarget, Importer};
use crate::core::state::{ExportMarker, HierarchyLocator, MarkerStore};
use crate::domain::errors::{HourglassError, StorageError};
use crate::domain::ids::TableName;
use crate::domain::Result;
use crate::{log_window_complete, log_window_start};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// Backends a coordinator runs against
pub struct PipelineParts {
    pub storage: ObjectStorage,
    pub markers: Arc<dyn MarkerStorage>,
    pub source: Arc<dyn SourceClient>,
    pub warehouse: Arc<dyn WarehouseClient>,
}

/// Per-run options, usually from the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Tables to process; empty means every configured table
    pub tables: Vec<String>,
    /// Overrides each table's `max_windows`
    pub max_windows: Option<usize>,
    /// Fetch and render only
    pub dry_run: bool,
    /// Reference time for deciding which windows are due
    pub now: DateTime<Utc>,
}

impl RunOptions {
    /// All tables, configured limits, evaluated at `now`
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            tables: Vec::new(),
            max_windows: None,
            dry_run: false,
            now,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct WindowOutcome {
    records: usize,
    bytes: u64,
    rows_deleted: u64,
}

/// Where a table's loop got to
#[derive(Debug, Default)]
struct TableProgress {
    windows_processed: usize,
    /// Window being worked on, or the next one due after the last success
    current: Option<ExportMarker>,
}

/// Pipeline coordinator
pub struct PipelineCoordinator {
    config: HourglassConfig,
    store: MarkerStore,
    locator: HierarchyLocator,
    exporter: Exporter,
    source: Arc<dyn SourceClient>,
    warehouse: Arc<dyn WarehouseClient>,
    shutdown: watch::Receiver<bool>,
}

impl PipelineCoordinator {
    /// Create a coordinator with backends built from configuration
    pub async fn new(config: HourglassConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let storage = create_object_storage(&config.storage)?;
        let source = create_source_client(&config)?;
        let (warehouse, markers) = create_warehouse_and_markers(&config)?;

        Ok(Self::from_parts(
            config,
            PipelineParts {
                storage,
                markers,
                source,
                warehouse,
            },
            shutdown,
        ))
    }

    /// Create a coordinator over explicit backends
    pub fn from_parts(
        config: HourglassConfig,
        parts: PipelineParts,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            store: MarkerStore::new_with_storage(parts.markers),
            locator: HierarchyLocator::new(parts.storage.clone()),
            exporter: Exporter::new(parts.storage),
            source: parts.source,
            warehouse: parts.warehouse,
            shutdown,
        }
    }

    /// Process every due window of the selected tables
    ///
    /// # Errors
    ///
    /// Returns an error only for problems that stop the whole run: an unknown
    /// table name or a marker table that cannot be created. Per-table failures
    /// are recorded in the summary.
    pub async fn run(&self, options: &RunOptions) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", run_id = %run_id, dry_run = options.dry_run);
        self.run_inner(options).instrument(span).await
    }

    async fn run_inner(&self, options: &RunOptions) -> Result<RunSummary> {
        let start_time = Instant::now();
        let mut summary = RunSummary::new(options.dry_run);
        let tables = self.select_tables(&options.tables)?;

        tracing::info!(
            tables = tables.len(),
            now = %options.now,
            "Starting run"
        );

        if !options.dry_run {
            self.store.ensure_table().await?;
        }

        for table in tables {
            if self.shutdown_requested() {
                tracing::warn!(
                    table = %table.name,
                    "Shutdown requested, skipping remaining tables"
                );
                summary.interrupted = true;
                break;
            }

            summary.tables_processed += 1;
            let mut progress = TableProgress::default();
            let result = self
                .process_table(table, options, &mut progress, &mut summary)
                .await;

            if let Err(e) = result {
                tracing::error!(
                    table = %table.name,
                    window = progress.current.as_ref().map(|m| m.to_string()).unwrap_or_default(),
                    error = %e,
                    "Table failed"
                );
                summary.add_error(RunError::from_error(
                    table.name.as_str(),
                    progress.current.as_ref(),
                    &e,
                ));
            }

            summary.tables.push(TableOutcome {
                table: table.name.to_string(),
                windows_processed: progress.windows_processed,
                next_marker: progress.current,
            });
        }

        summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    fn select_tables(&self, names: &[String]) -> Result<Vec<&TableConfig>> {
        if names.is_empty() {
            return Ok(self.config.tables.iter().collect());
        }
        names
            .iter()
            .map(|name| {
                self.config.table(name).ok_or_else(|| {
                    HourglassError::Validation(format!("Table '{name}' is not configured"))
                })
            })
            .collect()
    }

    async fn process_table(
        &self,
        table: &TableConfig,
        options: &RunOptions,
        progress: &mut TableProgress,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let settle = chrono::Duration::minutes(self.config.state.settle_minutes as i64);
        let max_windows = options.max_windows.unwrap_or(table.max_windows);

        let query = SourceQuery {
            table: table.name.clone(),
            time_column: table.time_column.clone(),
            columns: table.columns.clone(),
        };
        let importer = Importer::new(
            self.warehouse.clone(),
            ImportTarget {
                destination_table: table.destination().to_string(),
                time_column: table.time_column.clone(),
                bounds: self.config.import.delete_bounds,
                iam_role: self.config.storage.iam_role.clone(),
                region: self.config.storage.region.clone(),
            },
        );

        let mut marker = self.resolve_marker(&table.name, options.dry_run).await?;
        progress.current = Some(marker.clone());

        while progress.windows_processed < max_windows {
            if self.shutdown_requested() {
                tracing::warn!(
                    table = %table.name,
                    marker = %marker,
                    "Shutdown requested, stopping before next window"
                );
                summary.interrupted = true;
                break;
            }

            if !marker.window().is_closed_at(options.now, settle) {
                tracing::debug!(
                    table = %table.name,
                    window = %marker.window(),
                    "Window not yet due"
                );
                break;
            }

            let outcome = self
                .process_window(&marker, &query, &importer, options.dry_run)
                .await?;
            marker = if options.dry_run {
                marker.next()?
            } else {
                self.store.advance(&marker).await?
            };
            summary.record_window(outcome.records, outcome.bytes, outcome.rows_deleted);
            progress.windows_processed += 1;
            progress.current = Some(marker.clone());
        }

        Ok(())
    }

    /// Persisted marker, or the hour after the latest object when bootstrapping
    async fn resolve_marker(&self, table: &TableName, dry_run: bool) -> Result<ExportMarker> {
        let bucket = &self.config.storage.bucket;
        if let Some(marker) = self.store.find(bucket, table).await? {
            return Ok(marker);
        }

        let not_found = || HourglassError::MarkerNotFound {
            bucket: bucket.to_string(),
            table: table.to_string(),
        };
        if !self.config.state.bootstrap_from_storage {
            return Err(not_found());
        }

        let latest = self
            .locator
            .locate_latest(bucket, table)
            .await?
            .ok_or_else(not_found)?;
        let start = latest.next()?;

        tracing::info!(
            table = %table,
            latest = %latest,
            start = %start,
            "Bootstrapped marker from storage"
        );
        if !dry_run {
            self.store.seed(&start).await?;
        }
        Ok(start)
    }

    async fn process_window(
        &self,
        marker: &ExportMarker,
        query: &SourceQuery,
        importer: &Importer,
        dry_run: bool,
    ) -> Result<WindowOutcome> {
        let started = Instant::now();
        log_window_start!(marker);

        let rows = self.source.fetch_window(query, &marker.window()).await?;

        if dry_run {
            let bytes = render_records(&rows).len() as u64;
            tracing::info!(
                path = %marker.full_path(),
                records = rows.len(),
                bytes,
                destination = %importer.target().destination_table,
                "DRY RUN: would export, reload and advance"
            );
            return Ok(WindowOutcome {
                records: rows.len(),
                bytes,
                rows_deleted: 0,
            });
        }

        let export = self.exporter.export(marker, &rows).await?;
        if self.config.storage.verify_upload {
            let stored = self.exporter.object_length(marker).await?;
            if stored != export.bytes {
                return Err(StorageError::LengthMismatch {
                    bucket: marker.bucket().to_string(),
                    path: export.path,
                    expected: export.bytes,
                    actual: stored,
                }
                .into());
            }
        }

        let import = importer.import_marker(marker).await?;

        log_window_complete!(marker, export.record_count, started.elapsed());
        Ok(WindowOutcome {
            records: export.record_count,
            bytes: export.bytes,
            rows_deleted: import.rows_deleted,
        })
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }
}
