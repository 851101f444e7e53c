use crate::{domain::ObjectStorage, errors::HistoryError};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3::{Client as S3Client, error::SdkError, primitives::ByteStream};
use tracing;

#[derive(Debug, Clone)]
pub struct S3ObjectStorage {
    client: S3Client,
    bucket_name: String,
}

impl S3ObjectStorage {
    pub fn new(client: S3Client, bucket_name: String) -> Self {
        Self { client, bucket_name }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    /// Downloads an object with GetObject. A missing key is `Ok(None)`, not an error.
    async fn download(&self, key: &str) -> Result<Option<Vec<u8>>, HistoryError> {
        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, "S3: Downloading object");

        let result = self.client.get_object().bucket(&self.bucket_name).key(key).send().await;

        let output = match result {
            Ok(output) => output,
            Err(sdk_err) => {
                // Check specifically for NoSuchKey
                if let SdkError::ServiceError(service_err) = &sdk_err {
                    if service_err.err().meta().code() == Some("NoSuchKey") {
                        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, "S3: Object does not exist yet");
                        return Ok(None);
                    }
                }
                tracing::error!(s3_key = %key, bucket = %self.bucket_name, error = %sdk_err, "S3: Error downloading object");
                return Err(HistoryError::BackendError(
                    anyhow::Error::new(sdk_err).context(format!("S3: Failed to download object with key '{}'", key)),
                ));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .context(format!("S3: Failed to read body of object '{}'", key))?;

        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, "S3: Download successful");
        Ok(Some(data.into_bytes().to_vec()))
    }

    /// Uploads (overwrites) an object with PutObject.
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), HistoryError> {
        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, %content_type, bytes = data.len(), "S3: Uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .context(format!("S3: Failed to upload object with key '{}'", key))?;

        tracing::debug!(s3_key = %key, bucket = %self.bucket_name, "S3: Upload successful");
        Ok(())
    }
}
