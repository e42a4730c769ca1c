//! PostgreSQL adapter implementing database traits
//!
//! One adapter type serves all three roles: the marker table and warehouse
//! reloads run against the warehouse connection, window extraction against
//! the source connection.

use crate::adapters::database::traits::{
    BulkLoadRequest, DeleteWindowRequest, MarkerStorage, SourceClient, SourceQuery,
    WarehouseClient,
};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::PostgreSQLMarker;
use crate::core::export::record::DelimitedRow;
use crate::core::state::marker::ExportMarker;
use crate::domain::ids::{BucketName, TableName};
use crate::domain::window::TimeWindow;
use crate::domain::{HourglassError, Result};
use async_trait::async_trait;
use std::sync::Arc;

const DEFAULT_MARKERS_TABLE: &str = "import_markers";

/// PostgreSQL implementation of the database traits
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
    markers_table: String,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self::new_with_arc(Arc::new(client))
    }

    /// Create a new PostgreSQL adapter with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self {
            client,
            markers_table: DEFAULT_MARKERS_TABLE.to_string(),
        }
    }

    /// Use `table` as the marker table
    ///
    /// The name is interpolated into SQL; callers pass a validated identifier.
    pub fn with_markers_table(mut self, table: impl Into<String>) -> Self {
        self.markers_table = table.into();
        self
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    pub fn markers_table(&self) -> &str {
        &self.markers_table
    }
}

#[async_trait]
impl MarkerStorage for PostgreSQLAdapter {
    async fn ensure_marker_table(&self) -> Result<()> {
        self.client
            .batch_execute(&marker_table_ddl(&self.markers_table))
            .await?;
        tracing::info!(table = %self.markers_table, "Marker table ready");
        Ok(())
    }

    async fn load_marker(
        &self,
        bucket: &BucketName,
        table: &TableName,
    ) -> Result<Option<ExportMarker>> {
        let query = format!(
            "SELECT bucket, table_name, year, month, day, hour FROM {} \
             WHERE bucket = $1 AND table_name = $2",
            self.markers_table
        );
        let rows = self
            .client
            .query(&query, &[&bucket.as_str(), &table.as_str()])
            .await?;

        match rows.as_slice() {
            [] => Ok(None),
            [row] => PostgreSQLMarker::from_row(row)?.to_domain().map(Some),
            _ => Err(HourglassError::Database(format!(
                "Marker table {} holds {} rows for {bucket}/{table}",
                self.markers_table,
                rows.len()
            ))),
        }
    }

    async fn update_marker(&self, marker: &ExportMarker) -> Result<u64> {
        let statement = format!(
            "UPDATE {} SET year = $3, month = $4, day = $5, hour = $6 \
             WHERE bucket = $1 AND table_name = $2",
            self.markers_table
        );
        let row = PostgreSQLMarker::from_domain(marker);
        self.client.execute(&statement, &row.params()).await
    }

    async fn compare_and_swap_marker(
        &self,
        expected: &ExportMarker,
        next: &ExportMarker,
    ) -> Result<u64> {
        if expected.bucket() != next.bucket() || expected.table_name() != next.table_name() {
            return Err(HourglassError::Validation(format!(
                "Cannot swap marker {expected} for {next}: keys differ"
            )));
        }

        let statement = format!(
            "UPDATE {} SET year = $3, month = $4, day = $5, hour = $6 \
             WHERE bucket = $1 AND table_name = $2 \
             AND year = $7 AND month = $8 AND day = $9 AND hour = $10",
            self.markers_table
        );
        let old = PostgreSQLMarker::from_domain(expected);
        let new = PostgreSQLMarker::from_domain(next);
        self.client
            .execute(
                &statement,
                &[
                    &new.bucket,
                    &new.table_name,
                    &new.year,
                    &new.month,
                    &new.day,
                    &new.hour,
                    &old.year,
                    &old.month,
                    &old.day,
                    &old.hour,
                ],
            )
            .await
    }

    async fn insert_marker(&self, marker: &ExportMarker) -> Result<u64> {
        // No ON CONFLICT: Redshift does not support it.
        let statement = format!(
            "INSERT INTO {t} (bucket, table_name, year, month, day, hour) \
             SELECT $1::varchar, $2::varchar, $3::int, $4::int, $5::int, $6::int \
             WHERE NOT EXISTS (SELECT 1 FROM {t} WHERE bucket = $1 AND table_name = $2)",
            t = self.markers_table
        );
        let row = PostgreSQLMarker::from_domain(marker);
        self.client.execute(&statement, &row.params()).await
    }

    async fn list_markers(&self, bucket: &BucketName) -> Result<Vec<ExportMarker>> {
        let query = format!(
            "SELECT bucket, table_name, year, month, day, hour FROM {} \
             WHERE bucket = $1 ORDER BY table_name",
            self.markers_table
        );
        let rows = self.client.query(&query, &[&bucket.as_str()]).await?;
        rows.iter()
            .map(|row| PostgreSQLMarker::from_row(row)?.to_domain())
            .collect()
    }
}

#[async_trait]
impl WarehouseClient for PostgreSQLAdapter {
    async fn delete_window(&self, request: &DeleteWindowRequest) -> Result<u64> {
        let from = request.window.from().naive_utc();
        let to = request.window.to().naive_utc();
        self.client
            .execute(&request.statement(), &[&from, &to])
            .await
            .map_err(in_context(format!(
                "Delete of {} from {}",
                request.window, request.table
            )))
    }

    async fn bulk_load(&self, request: &BulkLoadRequest) -> Result<()> {
        self.client
            .batch_execute(&request.statement())
            .await
            .map_err(in_context(format!(
                "Load of {} into {}",
                request.object_url(),
                request.destination_table
            )))
    }
}

#[async_trait]
impl SourceClient for PostgreSQLAdapter {
    async fn fetch_window(
        &self,
        query: &SourceQuery,
        window: &TimeWindow,
    ) -> Result<Vec<DelimitedRow>> {
        let from = window.from().naive_utc();
        let to = window.to().naive_utc();
        let rows = self
            .client
            .query(&query.statement(), &[&from, &to])
            .await
            .map_err(in_context(format!("Fetch of {window} from {}", query.table)))?;

        let columns: Arc<[String]> = query.columns.clone().into();
        rows.iter()
            .map(|row| {
                let values = (0..columns.len())
                    .map(|i| row.try_get::<_, Option<String>>(i))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| {
                        HourglassError::Database(format!(
                            "Failed to read row from {}: {e}",
                            query.table
                        ))
                    })?;
                Ok(DelimitedRow::new(columns.clone(), values))
            })
            .collect()
    }
}

/// Prefix database errors with what was being attempted
fn in_context(context: String) -> impl FnOnce(HourglassError) -> HourglassError {
    move |error| match error {
        HourglassError::Database(message) => {
            HourglassError::Database(format!("{context}: {message}"))
        }
        other => other,
    }
}

fn marker_table_ddl(markers_table: &str) -> String {
    include_str!("../../../migrations/001_import_markers.sql")
        .replace(DEFAULT_MARKERS_TABLE, markers_table)
}
