use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use tracing::debug;

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Write side of the object store. One call is one attempt; callers decide
/// what a failure means.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `path` under `key`, replacing any existing object.
    async fn put_file(&self, path: &Path, key: &str, content_type: &str) -> Result<(), StorageError>;

    fn bucket(&self) -> &str;
}

/// Amazon S3 bucket.
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(sdk_config: &SdkConfig, bucket: &str) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put_file(&self, path: &Path, key: &str, content_type: &str) -> Result<(), StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::ReadFile(path.display().to_string(), e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::PutObject(key.to_string(), e.to_string()))?;

        debug!(bucket = self.bucket, key, path = %path.display(), "stored object in S3");
        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read {0} for upload: {1}")]
    ReadFile(String, String),
    #[error("failed to put object {0}: {1}")]
    PutObject(String, String),
}
