//! S3 object store construction

use super::ObjectStorage;
use crate::config::StorageConfig;
use crate::domain::errors::StorageError;
use crate::domain::Result;
use object_store::aws::AmazonS3Builder;
use object_store::{ClientOptions, ObjectStore};
use std::sync::Arc;
use std::time::Duration;

/// Build an S3 client bound to the configured bucket
///
/// Credentials come from the environment (`AWS_ACCESS_KEY_ID`, instance
/// profile, web identity) as resolved by `AmazonS3Builder::from_env`.
pub fn create_object_storage(config: &StorageConfig) -> Result<ObjectStorage> {
    let client_options = ClientOptions::new()
        .with_timeout(Duration::from_secs(config.request_timeout_seconds))
        .with_allow_http(config.allow_http);

    let mut builder = AmazonS3Builder::from_env()
        .with_bucket_name(config.bucket.as_str())
        .with_region(&config.region)
        .with_client_options(client_options);

    if let Some(endpoint) = &config.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_virtual_hosted_style_request(false)
            .with_allow_http(config.allow_http);
    }

    let store = builder
        .build()
        .map_err(|e| StorageError::ClientBuild(e.to_string()))?;

    tracing::info!(
        bucket = %config.bucket,
        region = %config.region,
        endpoint = config.endpoint.as_deref().unwrap_or("aws"),
        "Created S3 object store client"
    );

    let store: Arc<dyn ObjectStore> = Arc::new(store);
    Ok(ObjectStorage::new(config.bucket.clone(), store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::BucketName;

    fn config() -> StorageConfig {
        StorageConfig {
            bucket: BucketName::new("archive").unwrap(),
            region: "eu-west-1".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            iam_role: "arn:aws:iam::123456789012:role/loader".to_string(),
            allow_http: true,
            request_timeout_seconds: 5,
            verify_upload: true,
        }
    }

    #[test]
    fn test_builds_client_for_custom_endpoint() {
        let storage = create_object_storage(&config()).unwrap();
        assert_eq!(storage.bucket().as_str(), "archive");
    }
}
