//! Database abstraction traits
//!
//! The pipeline talks to three database roles: the marker table, the
//! warehouse it reloads into and the source it extracts from. Each role is a
//! trait so that the coordinator can run against in-memory fakes.

use crate::core::export::record::DelimitedRow;
use crate::core::state::marker::ExportMarker;
use crate::domain::ids::{BucketName, TableName};
use crate::domain::window::{TimeWindow, WindowBounds};
use crate::domain::Result;
use async_trait::async_trait;

/// Delete of one window's rows from a warehouse table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteWindowRequest {
    pub table: String,
    pub time_column: String,
    pub window: TimeWindow,
    pub bounds: WindowBounds,
}

impl DeleteWindowRequest {
    /// Parameterized DELETE; `$1` is the window start, `$2` the window end
    pub fn statement(&self) -> String {
        format!(
            "DELETE FROM {table} WHERE {column} >= $1::timestamp AND {column} {upper} $2::timestamp",
            table = self.table,
            column = self.time_column,
            upper = self.bounds.upper_operator(),
        )
    }
}

/// Bulk load of one archived object into a warehouse table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkLoadRequest {
    pub destination_table: String,
    pub bucket: String,
    pub object_path: String,
    pub iam_role: String,
    pub region: String,
}

impl BulkLoadRequest {
    /// `s3://{bucket}/{object_path}`
    pub fn object_url(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.object_path)
    }

    /// Redshift COPY statement
    ///
    /// COPY does not accept bind parameters, so literals are quoted here.
    pub fn statement(&self) -> String {
        format!(
            "COPY {table} FROM '{url}' WITH CREDENTIALS 'aws_iam_role={role}' REGION '{region}' DELIMITER '|' IGNOREHEADER 1 NULL AS 'NULL' ESCAPE",
            table = self.destination_table,
            url = quote_literal(&self.object_url()),
            role = quote_literal(&self.iam_role),
            region = quote_literal(&self.region),
        )
    }
}

/// Select of one window's rows from a source table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub table: TableName,
    pub time_column: String,
    pub columns: Vec<String>,
}

impl SourceQuery {
    /// Parameterized SELECT casting every column to text
    pub fn statement(&self) -> String {
        let select_list = self
            .columns
            .iter()
            .map(|column| format!("CAST({column} AS TEXT) AS {column}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "SELECT {select_list} FROM {table} WHERE {time} >= $1::timestamp AND {time} < $2::timestamp ORDER BY {time}",
            table = self.table,
            time = self.time_column,
        )
    }
}

fn quote_literal(raw: &str) -> String {
    raw.replace('\'', "''")
}

/// Persistence of export markers, one row per (bucket, table)
///
/// Row counts are returned raw; [`crate::core::state::MarkerStore`] turns
/// them into NotFound/Conflict errors.
#[async_trait]
pub trait MarkerStorage: Send + Sync {
    /// Create the marker table if the backend needs one
    async fn ensure_marker_table(&self) -> Result<()> {
        Ok(())
    }

    /// Load the marker row for the key, if any
    async fn load_marker(
        &self,
        bucket: &BucketName,
        table: &TableName,
    ) -> Result<Option<ExportMarker>>;

    /// Overwrite the hour of an existing row; returns rows affected
    async fn update_marker(&self, marker: &ExportMarker) -> Result<u64>;

    /// Overwrite the row with `next` only if it still equals `expected`;
    /// returns rows affected
    async fn compare_and_swap_marker(
        &self,
        expected: &ExportMarker,
        next: &ExportMarker,
    ) -> Result<u64>;

    /// Insert a row if none exists for the key; returns rows affected
    async fn insert_marker(&self, marker: &ExportMarker) -> Result<u64>;

    /// Every marker row for the bucket
    async fn list_markers(&self, bucket: &BucketName) -> Result<Vec<ExportMarker>>;
}

/// Destination warehouse operations
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Delete the rows of one window; returns rows deleted
    async fn delete_window(&self, request: &DeleteWindowRequest) -> Result<u64>;

    /// Load one archived object into the destination table
    async fn bulk_load(&self, request: &BulkLoadRequest) -> Result<()>;
}

/// Source database operations
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch every row whose time column falls inside `window`
    async fn fetch_window(
        &self,
        query: &SourceQuery,
        window: &TimeWindow,
    ) -> Result<Vec<DelimitedRow>>;
}
