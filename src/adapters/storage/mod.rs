//! Object storage integration
//!
//! [`ObjectStorage`] binds an `object_store` client to one bucket and exposes
//! the three operations the pipeline needs: list immediate children of a
//! prefix, upload a text object and read back an object's size. Every error
//! is annotated with the bucket and key it concerns.

pub mod s3;

use crate::domain::errors::StorageError;
use crate::domain::ids::BucketName;
use crate::domain::Result;
use bytes::Bytes;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;

pub use s3::create_object_storage;

/// Content type set on uploaded exports
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// An object store client bound to a single bucket
#[derive(Clone)]
pub struct ObjectStorage {
    bucket: BucketName,
    store: Arc<dyn ObjectStore>,
}

impl ObjectStorage {
    pub fn new(bucket: BucketName, store: Arc<dyn ObjectStore>) -> Self {
        Self { bucket, store }
    }

    /// Process-local store, used for tests and local trials
    pub fn in_memory(bucket: BucketName) -> Self {
        Self::new(bucket, Arc::new(InMemory::new()))
    }

    pub fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    /// Names of the immediate children of `prefix`
    ///
    /// Sub-prefixes ("directories") are returned if there are any, otherwise
    /// the names of the objects directly under `prefix`. Pagination is handled
    /// by the client, so the result is complete.
    pub async fn list_children(&self, prefix: &str) -> Result<Vec<String>> {
        let location = Path::from(prefix);
        let listing = self
            .store
            .list_with_delimiter(Some(&location))
            .await
            .map_err(|e| StorageError::ListFailed {
                bucket: self.bucket.to_string(),
                prefix: prefix.to_string(),
                message: e.to_string(),
            })?;

        let names = if listing.common_prefixes.is_empty() {
            listing
                .objects
                .iter()
                .filter_map(|meta| meta.location.filename().map(str::to_string))
                .collect()
        } else {
            listing
                .common_prefixes
                .iter()
                .filter_map(|path| path.filename().map(str::to_string))
                .collect()
        };

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            children = ?names,
            "Listed prefix"
        );
        Ok(names)
    }

    /// Upload `body` as a single `text/plain` object at `path`
    pub async fn put_text(&self, path: &str, body: Bytes) -> Result<()> {
        let location = Path::from(path);
        let options = PutOptions {
            attributes: Attributes::from_iter([(
                Attribute::ContentType,
                AttributeValue::from(TEXT_CONTENT_TYPE),
            )]),
            ..Default::default()
        };

        self.store
            .put_opts(&location, PutPayload::from(body), options)
            .await
            .map_err(|e| StorageError::PutFailed {
                bucket: self.bucket.to_string(),
                path: path.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Size in bytes of the object at `path`
    pub async fn object_length(&self, path: &str) -> Result<u64> {
        let location = Path::from(path);
        let meta = self
            .store
            .head(&location)
            .await
            .map_err(|e| StorageError::HeadFailed {
                bucket: self.bucket.to_string(),
                path: path.to_string(),
                message: e.to_string(),
            })?;
        Ok(meta.size as u64)
    }
}

impl std::fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("bucket", &self.bucket)
            .field("store", &self.store.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::HourglassError;

    fn storage() -> ObjectStorage {
        ObjectStorage::in_memory(BucketName::new("archive").unwrap())
    }

    async fn touch(storage: &ObjectStorage, path: &str) {
        storage.put_text(path, Bytes::from_static(b"x")).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_children_prefers_prefixes() {
        let storage = storage();
        touch(&storage, "events/2021/01/01/events-2021010100.txt").await;
        touch(&storage, "events/2022/01/01/events-2022010100.txt").await;
        touch(&storage, "events/README").await;

        let mut children = storage.list_children("events").await.unwrap();
        children.sort();
        assert_eq!(children, vec!["2021".to_string(), "2022".to_string()]);
    }

    #[tokio::test]
    async fn test_list_children_falls_back_to_objects() {
        let storage = storage();
        touch(&storage, "events/2023/06/15/events-2023061509.txt").await;
        touch(&storage, "events/2023/06/15/events-2023061510.txt").await;

        let mut children = storage.list_children("events/2023/06/15").await.unwrap();
        children.sort();
        assert_eq!(
            children,
            vec![
                "events-2023061509.txt".to_string(),
                "events-2023061510.txt".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_list_children_of_missing_prefix_is_empty() {
        let children = storage().list_children("missing").await.unwrap();
        assert!(children.is_empty());
    }

    #[tokio::test]
    async fn test_object_length() {
        let storage = storage();
        storage
            .put_text("events/a.txt", Bytes::from_static(b"id\n1\n"))
            .await
            .unwrap();
        assert_eq!(storage.object_length("events/a.txt").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_head_missing_object_names_path() {
        let err = storage().object_length("events/none.txt").await.unwrap_err();
        match err {
            HourglassError::Storage(StorageError::HeadFailed { bucket, path, .. }) => {
                assert_eq!(bucket, "archive");
                assert_eq!(path, "events/none.txt");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
