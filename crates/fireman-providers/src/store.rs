//! Remote object storage for the client configuration and cached token.
//!
//! Objects are addressed by bucket + key. Production runs use S3 through
//! `object_store`; tests swap in the in-memory backend.

use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Location of the S3 bucket holding the credentials and token objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    /// Bucket name.
    pub bucket: String,
    /// AWS region of the bucket.
    pub region: String,
    /// Custom endpoint for S3-compatible services.
    pub endpoint: Option<String>,
}

impl S3Location {
    /// Creates a location for the given bucket and region.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint: None,
        }
    }

    /// Sets a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Key-value blob storage used for the credentials and token objects.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    inner: Arc<dyn ObjectStore>,
}

impl RemoteStore {
    /// Wraps an existing object store.
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    /// Connects to an S3 bucket.
    ///
    /// Access keys and session tokens are picked up from the standard
    /// `AWS_*` environment variables.
    pub fn s3(location: &S3Location) -> ProviderResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&location.bucket)
            .with_region(&location.region);

        if let Some(ref endpoint) = location.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder.build().map_err(|e| {
            ProviderError::storage(format!(
                "failed to configure S3 bucket {}: {}",
                location.bucket, e
            ))
            .with_source(e)
        })?;

        debug!(bucket = %location.bucket, region = %location.region, "using S3 store");
        Ok(Self::new(Arc::new(store)))
    }

    /// Creates an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }

    /// Downloads an object into memory.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    pub async fn get(&self, key: &str) -> ProviderResult<Option<Vec<u8>>> {
        let path = ObjectPath::from(key);

        let result = match self.inner.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                debug!(key, "object not found");
                return Ok(None);
            }
            Err(e) => {
                return Err(
                    ProviderError::storage(format!("failed to download {}: {}", key, e))
                        .with_source(e),
                );
            }
        };

        let bytes = result.bytes().await.map_err(|e| {
            ProviderError::storage(format!("failed to read {}: {}", key, e)).with_source(e)
        })?;

        debug!(key, size = bytes.len(), "downloaded object");
        Ok(Some(bytes.to_vec()))
    }

    /// Uploads a buffer as an object, replacing any previous content.
    pub async fn put(&self, key: &str, body: Vec<u8>) -> ProviderResult<()> {
        let path = ObjectPath::from(key);
        let size = body.len();

        self.inner
            .put(&path, PutPayload::from(body))
            .await
            .map_err(|e| {
                ProviderError::storage(format!("failed to upload {}: {}", key, e)).with_source(e)
            })?;

        debug!(key, size, "uploaded object");
        Ok(())
    }
}

/// S3 client for a bucket served by a local mock endpoint.
#[cfg(test)]
pub(crate) fn s3_test_store(endpoint: &str) -> RemoteStore {
    let store = AmazonS3Builder::new()
        .with_bucket_name("fireman-resolver")
        .with_region("us-east-1")
        .with_endpoint(endpoint)
        .with_allow_http(true)
        .with_access_key_id("test")
        .with_secret_access_key("test")
        .build()
        .unwrap();
    RemoteStore::new(Arc::new(store))
}
