//! Marker store for watermark persistence
//!
//! Wraps a [`MarkerStorage`] backend and turns its raw row counts into the
//! marker state machine: a key is uninitialized until seeded, then only ever
//! moves forward one hour at a time.

use crate::adapters::database::traits::MarkerStorage;
use crate::core::state::marker::ExportMarker;
use crate::domain::errors::HourglassError;
use crate::domain::ids::{BucketName, TableName};
use crate::domain::Result;
use std::sync::Arc;

/// Loads, seeds and advances export markers
pub struct MarkerStore {
    storage: Arc<dyn MarkerStorage>,
}

impl MarkerStore {
    /// Create a new MarkerStore with a storage backend
    pub fn new_with_storage(storage: Arc<dyn MarkerStorage>) -> Self {
        Self { storage }
    }

    /// Create the backing table if the backend needs one
    pub async fn ensure_table(&self) -> Result<()> {
        self.storage.ensure_marker_table().await
    }

    /// Load the persisted marker for a table
    ///
    /// # Errors
    ///
    /// Returns `MarkerNotFound` if the key has never been seeded.
    pub async fn get(&self, bucket: &BucketName, table: &TableName) -> Result<ExportMarker> {
        self.find(bucket, table)
            .await?
            .ok_or_else(|| HourglassError::MarkerNotFound {
                bucket: bucket.to_string(),
                table: table.to_string(),
            })
    }

    /// Load the persisted marker for a table, `None` if unseeded
    pub async fn find(
        &self,
        bucket: &BucketName,
        table: &TableName,
    ) -> Result<Option<ExportMarker>> {
        self.storage.load_marker(bucket, table).await
    }

    /// Overwrite the persisted hour for the marker's key
    ///
    /// Never inserts.
    ///
    /// # Errors
    ///
    /// Returns `MarkerNotFound` if no row exists for the key.
    pub async fn update(&self, marker: &ExportMarker) -> Result<()> {
        let affected = self.storage.update_marker(marker).await?;
        if affected == 0 {
            return Err(HourglassError::MarkerNotFound {
                bucket: marker.bucket().to_string(),
                table: marker.table_name().to_string(),
            });
        }

        tracing::info!(
            bucket = %marker.bucket(),
            table = %marker.table_name(),
            marker = %marker,
            "Export marker overwritten"
        );
        Ok(())
    }

    /// Move the persisted marker from `current` to `current.next()`
    ///
    /// # Errors
    ///
    /// Returns `MarkerConflict` if the row no longer equals `current`.
    pub async fn advance(&self, current: &ExportMarker) -> Result<ExportMarker> {
        let next = current.next()?;
        let affected = self.storage.compare_and_swap_marker(current, &next).await?;
        if affected == 0 {
            return Err(HourglassError::MarkerConflict {
                bucket: current.bucket().to_string(),
                table: current.table_name().to_string(),
                expected: current.time().format("%Y-%m-%dT%H").to_string(),
            });
        }

        tracing::info!(
            bucket = %current.bucket(),
            table = %current.table_name(),
            from = %current.time().format("%Y-%m-%dT%H"),
            to = %next.time().format("%Y-%m-%dT%H"),
            "Export marker advanced"
        );
        Ok(next)
    }

    /// Insert the first marker for a key
    ///
    /// # Errors
    ///
    /// Returns a Validation error if the key already has a marker.
    pub async fn seed(&self, marker: &ExportMarker) -> Result<()> {
        let affected = self.storage.insert_marker(marker).await?;
        if affected == 0 {
            return Err(HourglassError::Validation(format!(
                "Export marker for bucket '{}' and table '{}' already exists",
                marker.bucket(),
                marker.table_name()
            )));
        }

        tracing::info!(
            bucket = %marker.bucket(),
            table = %marker.table_name(),
            marker = %marker,
            "Export marker seeded"
        );
        Ok(())
    }

    /// Every persisted marker for the bucket
    pub async fn list(&self, bucket: &BucketName) -> Result<Vec<ExportMarker>> {
        self.storage.list_markers(bucket).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStorage {
        rows: Mutex<HashMap<(BucketName, TableName), ExportMarker>>,
    }

    #[async_trait]
    impl MarkerStorage for MapStorage {
        async fn load_marker(
            &self,
            bucket: &BucketName,
            table: &TableName,
        ) -> Result<Option<ExportMarker>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.get(&(bucket.clone(), table.clone())).cloned())
        }

        async fn update_marker(&self, marker: &ExportMarker) -> Result<u64> {
            let mut rows = self.rows.lock().unwrap();
            let key = (marker.bucket().clone(), marker.table_name().clone());
            match rows.get_mut(&key) {
                Some(row) => {
                    *row = marker.clone();
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn compare_and_swap_marker(
            &self,
            expected: &ExportMarker,
            next: &ExportMarker,
        ) -> Result<u64> {
            let mut rows = self.rows.lock().unwrap();
            let key = (expected.bucket().clone(), expected.table_name().clone());
            match rows.get_mut(&key) {
                Some(row) if row == expected => {
                    *row = next.clone();
                    Ok(1)
                }
                _ => Ok(0),
            }
        }

        async fn insert_marker(&self, marker: &ExportMarker) -> Result<u64> {
            let mut rows = self.rows.lock().unwrap();
            let key = (marker.bucket().clone(), marker.table_name().clone());
            if rows.contains_key(&key) {
                return Ok(0);
            }
            rows.insert(key, marker.clone());
            Ok(1)
        }

        async fn list_markers(&self, bucket: &BucketName) -> Result<Vec<ExportMarker>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .values()
                .filter(|m| m.bucket() == bucket)
                .cloned()
                .collect())
        }
    }

    fn bucket() -> BucketName {
        BucketName::new("archive").unwrap()
    }

    fn table() -> TableName {
        TableName::new("events").unwrap()
    }

    fn marker(h: u32) -> ExportMarker {
        ExportMarker::new(bucket(), table(), 2023, 6, 15, h).unwrap()
    }

    fn store() -> MarkerStore {
        MarkerStore::new_with_storage(Arc::new(MapStorage::default()))
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let err = store().get(&bucket(), &table()).await.unwrap_err();
        assert!(matches!(err, HourglassError::MarkerNotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_never_inserts() {
        let store = store();
        let err = store.update(&marker(9)).await.unwrap_err();
        assert!(matches!(err, HourglassError::MarkerNotFound { .. }));
        assert!(store.find(&bucket(), &table()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_then_get() {
        let store = store();
        store.seed(&marker(9)).await.unwrap();
        assert_eq!(store.get(&bucket(), &table()).await.unwrap(), marker(9));
    }

    #[tokio::test]
    async fn test_seed_twice_fails() {
        let store = store();
        store.seed(&marker(9)).await.unwrap();
        let err = store.seed(&marker(3)).await.unwrap_err();
        assert!(matches!(err, HourglassError::Validation(_)));
        assert_eq!(store.get(&bucket(), &table()).await.unwrap(), marker(9));
    }

    #[tokio::test]
    async fn test_advance_moves_one_hour() {
        let store = store();
        store.seed(&marker(9)).await.unwrap();
        let next = store.advance(&marker(9)).await.unwrap();
        assert_eq!(next, marker(10));
        assert_eq!(store.get(&bucket(), &table()).await.unwrap(), marker(10));
    }

    #[tokio::test]
    async fn test_advance_from_stale_marker_conflicts() {
        let store = store();
        store.seed(&marker(9)).await.unwrap();
        store.advance(&marker(9)).await.unwrap();

        let err = store.advance(&marker(9)).await.unwrap_err();
        assert!(matches!(err, HourglassError::MarkerConflict { .. }));
        assert_eq!(store.get(&bucket(), &table()).await.unwrap(), marker(10));
    }

    #[tokio::test]
    async fn test_update_overwrites() {
        let store = store();
        store.seed(&marker(9)).await.unwrap();
        store.update(&marker(3)).await.unwrap();
        assert_eq!(store.get(&bucket(), &table()).await.unwrap(), marker(3));
    }

    #[tokio::test]
    async fn test_list_filters_by_bucket() {
        let store = store();
        store.seed(&marker(9)).await.unwrap();
        let other = ExportMarker::new(
            BucketName::new("other").unwrap(),
            table(),
            2023,
            6,
            15,
            9,
        )
        .unwrap();
        store.seed(&other).await.unwrap();

        let listed = store.list(&bucket()).await.unwrap();
        assert_eq!(listed, vec![marker(9)]);
    }
}
