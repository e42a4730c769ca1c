//! Reload one archived window into the warehouse
//!
//! Import is delete-then-load: the window's rows are removed from the
//! destination table and the hourly object is bulk loaded in their place.
//! Running it twice for the same marker leaves the same rows behind.

use crate::adapters::database::traits::{BulkLoadRequest, DeleteWindowRequest, WarehouseClient};
use crate::core::state::marker::ExportMarker;
use crate::domain::window::WindowBounds;
use crate::domain::Result;
use std::sync::Arc;

/// Where and how a table's windows are reloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    /// Warehouse table receiving the rows
    pub destination_table: String,
    /// Timestamp column the delete is bounded on
    pub time_column: String,
    /// Delete bounds
    pub bounds: WindowBounds,
    /// IAM role the warehouse assumes to read the bucket
    pub iam_role: String,
    /// Bucket region
    pub region: String,
}

/// Result of one import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub rows_deleted: u64,
}

/// Deletes and reloads windows of one destination table
pub struct Importer {
    warehouse: Arc<dyn WarehouseClient>,
    target: ImportTarget,
}

impl Importer {
    pub fn new(warehouse: Arc<dyn WarehouseClient>, target: ImportTarget) -> Self {
        Self { warehouse, target }
    }

    pub fn target(&self) -> &ImportTarget {
        &self.target
    }

    /// Delete the marker's window, then load the marker's object
    ///
    /// If the load fails after the delete succeeded the window is left empty
    /// in the warehouse; the error is returned and a rerun repairs it.
    pub async fn import_marker(&self, marker: &ExportMarker) -> Result<ImportOutcome> {
        let rows_deleted = self.delete_window(marker).await?;
        self.load_object(marker).await.inspect_err(|e| {
            tracing::error!(
                table = %self.target.destination_table,
                marker = %marker,
                rows_deleted,
                error = %e,
                "Bulk load failed after delete; window is empty until rerun"
            );
        })?;
        Ok(ImportOutcome { rows_deleted })
    }

    /// Delete destination rows whose time column falls in the marker's window
    pub async fn delete_window(&self, marker: &ExportMarker) -> Result<u64> {
        let request = self.delete_request(marker);
        let deleted = self.warehouse.delete_window(&request).await?;
        tracing::info!(
            table = %request.table,
            window = %request.window,
            bounds = %request.bounds,
            rows_deleted = deleted,
            "Deleted window from warehouse"
        );
        Ok(deleted)
    }

    /// Bulk load the marker's object into the destination table
    pub async fn load_object(&self, marker: &ExportMarker) -> Result<()> {
        let request = self.load_request(marker);
        self.warehouse.bulk_load(&request).await?;
        tracing::info!(
            table = %request.destination_table,
            object = %request.object_url(),
            "Loaded object into warehouse"
        );
        Ok(())
    }

    pub fn delete_request(&self, marker: &ExportMarker) -> DeleteWindowRequest {
        DeleteWindowRequest {
            table: self.target.destination_table.clone(),
            time_column: self.target.time_column.clone(),
            window: marker.window(),
            bounds: self.target.bounds,
        }
    }

    pub fn load_request(&self, marker: &ExportMarker) -> BulkLoadRequest {
        BulkLoadRequest {
            destination_table: self.target.destination_table.clone(),
            bucket: marker.bucket().to_string(),
            object_path: marker.full_path(),
            iam_role: self.target.iam_role.clone(),
            region: self.target.region.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::HourglassError;
    use crate::domain::ids::{BucketName, TableName};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Delete(DeleteWindowRequest),
        Load(BulkLoadRequest),
    }

    #[derive(Default)]
    struct RecordingWarehouse {
        calls: Mutex<Vec<Call>>,
        fail_load: bool,
    }

    #[async_trait]
    impl WarehouseClient for RecordingWarehouse {
        async fn delete_window(&self, request: &DeleteWindowRequest) -> Result<u64> {
            self.calls.lock().unwrap().push(Call::Delete(request.clone()));
            Ok(3)
        }

        async fn bulk_load(&self, request: &BulkLoadRequest) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Load(request.clone()));
            if self.fail_load {
                return Err(HourglassError::Database("COPY failed".to_string()));
            }
            Ok(())
        }
    }

    fn target() -> ImportTarget {
        ImportTarget {
            destination_table: "events".to_string(),
            time_column: "created_at".to_string(),
            bounds: WindowBounds::HalfOpen,
            iam_role: "arn:aws:iam::123456789012:role/loader".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    fn marker() -> ExportMarker {
        ExportMarker::new(
            BucketName::new("archive").unwrap(),
            TableName::new("events").unwrap(),
            2023,
            6,
            15,
            9,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_import_deletes_window_before_loading_same_path() {
        let warehouse = Arc::new(RecordingWarehouse::default());
        let importer = Importer::new(warehouse.clone(), target());

        let outcome = importer.import_marker(&marker()).await.unwrap();
        assert_eq!(outcome.rows_deleted, 3);

        let calls = warehouse.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        match (&calls[0], &calls[1]) {
            (Call::Delete(delete), Call::Load(load)) => {
                assert_eq!(
                    delete.window.from(),
                    Utc.with_ymd_and_hms(2023, 6, 15, 9, 0, 0).unwrap()
                );
                assert_eq!(
                    delete.window.to(),
                    Utc.with_ymd_and_hms(2023, 6, 15, 10, 0, 0).unwrap()
                );
                assert_eq!(load.object_path, "events/2023/06/15/events-2023061509.txt");
                assert_eq!(load.bucket, "archive");
            }
            other => panic!("unexpected call order: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_failure_surfaces_after_delete() {
        let warehouse = Arc::new(RecordingWarehouse {
            fail_load: true,
            ..Default::default()
        });
        let importer = Importer::new(warehouse.clone(), target());

        let err = importer.import_marker(&marker()).await.unwrap_err();
        assert!(matches!(err, HourglassError::Database(_)));
        assert_eq!(warehouse.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_requests_follow_target() {
        let importer = Importer::new(
            Arc::new(RecordingWarehouse::default()),
            ImportTarget {
                destination_table: "analytics.events".to_string(),
                bounds: WindowBounds::Closed,
                ..target()
            },
        );
        let delete = importer.delete_request(&marker());
        assert_eq!(delete.table, "analytics.events");
        assert_eq!(delete.bounds, WindowBounds::Closed);

        let load = importer.load_request(&marker());
        assert_eq!(
            load.object_url(),
            "s3://archive/events/2023/06/15/events-2023061509.txt"
        );
    }
}
