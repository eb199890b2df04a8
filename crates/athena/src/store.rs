//! Object-store seam and its S3 implementation.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::AthenaError;

/// Read access to the bucket Athena writes result files into.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Download the full object at `bucket`/`key`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, AthenaError>;
}

/// [`ResultStore`] backed by the AWS SDK S3 client.
#[derive(Debug, Clone)]
pub struct S3ResultStore {
    client: aws_sdk_s3::Client,
}

impl S3ResultStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(sdk_config: &aws_types::SdkConfig) -> Self {
        Self::new(aws_sdk_s3::Client::new(sdk_config))
    }
}

#[async_trait]
impl ResultStore for S3ResultStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, AthenaError> {
        let storage_error = |reason: String| AthenaError::Storage {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    storage_error("object not found".into())
                } else {
                    storage_error(service_error.to_string())
                }
            })?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| storage_error(e.to_string()))?
            .into_bytes();

        debug!(bucket = %bucket, key = %key, bytes = body.len(), "Fetched result object");
        Ok(body)
    }
}
