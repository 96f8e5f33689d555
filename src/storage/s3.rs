use std::path::Path;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{
    Client, error::DisplayErrorContext, primitives::ByteStream, types::ServerSideEncryption,
};
use log::debug;

use super::{ObjectStore, StorageError, UploadOptions, write_private_file};

pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn download_to_file(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<(), StorageError> {
        let download_error = |reason: String| StorageError::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| download_error(DisplayErrorContext(&err).to_string()))?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|err| download_error(err.to_string()))?
            .into_bytes();

        write_private_file(destination, &body).await?;
        debug!(
            "[s3] downloaded s3://{}/{} to {} ({} bytes)",
            bucket,
            key,
            destination.display(),
            body.len()
        );
        Ok(())
    }

    async fn upload_file(
        &self,
        source: &Path,
        bucket: &str,
        key: &str,
        options: UploadOptions,
    ) -> Result<(), StorageError> {
        let upload_error = |reason: String| StorageError::Upload {
            path: source.to_path_buf(),
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let body = ByteStream::from_path(source)
            .await
            .map_err(|err| upload_error(err.to_string()))?;

        let mut request = self.client.put_object().bucket(bucket).key(key).body(body);
        if options.server_side_encryption {
            request = request.server_side_encryption(ServerSideEncryption::Aes256);
        }

        request
            .send()
            .await
            .map_err(|err| upload_error(DisplayErrorContext(&err).to_string()))?;

        debug!(
            "[s3] put {} as s3://{}/{} (sse: {})",
            source.display(),
            bucket,
            key,
            options.server_side_encryption
        );
        Ok(())
    }
}
