use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};

mod s3;

pub use s3::S3Store;

const CREDENTIALS_OBJECT: &str = "dns/cloudflare.ini";

/// Blob storage holding the DNS credentials and the issued certificates.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn download_to_file(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<(), StorageError>;

    async fn upload_file(
        &self,
        source: &Path,
        bucket: &str,
        key: &str,
        options: UploadOptions,
    ) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Request AES-256 server-side encryption at rest.
    pub server_side_encryption: bool,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to download s3://{bucket}/{key}: {reason}")]
    Download {
        bucket: String,
        key: String,
        reason: String,
    },
    #[error("failed to upload {} to s3://{bucket}/{key}: {reason}", .path.display())]
    Upload {
        path: PathBuf,
        bucket: String,
        key: String,
        reason: String,
    },
    #[error("local file error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Key of the Cloudflare credential file under the configured prefix.
pub fn credentials_key(s3_path: &str) -> String {
    format!("{s3_path}/{CREDENTIALS_OBJECT}")
}

/// Prefix every artifact of a lineage is stored under, with trailing slash.
pub fn artifact_prefix(s3_path: &str, primary_domain: &str) -> String {
    format!("{s3_path}/live/{primary_domain}/")
}

pub fn artifact_key(s3_path: &str, primary_domain: &str, filename: &str) -> String {
    format!("{}{filename}", artifact_prefix(s3_path, primary_domain))
}

/// Writes secret material readable by the owner only.
pub(crate) async fn write_private_file(path: &Path, content: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|err| StorageError::io(parent, err))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .await
        .map_err(|err| StorageError::io(path, err))?;
    file.write_all(content)
        .await
        .map_err(|err| StorageError::io(path, err))?;
    file.flush()
        .await
        .map_err(|err| StorageError::io(path, err))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn builds_remote_layout() {
        assert_eq!(credentials_key("letsencrypt"), "letsencrypt/dns/cloudflare.ini");
        assert_eq!(
            artifact_prefix("letsencrypt", "example.com"),
            "letsencrypt/live/example.com/"
        );
        assert_eq!(
            artifact_key("letsencrypt", "example.com", "privkey.pem"),
            "letsencrypt/live/example.com/privkey.pem"
        );
    }

    #[tokio::test]
    async fn private_file_is_owner_only() {
        let dir = std::env::temp_dir().join(format!("certbot-storage-{}", Uuid::new_v4()));
        let path = dir.join("nested").join("cloudflare.ini");
        write_private_file(&path, b"dns_cloudflare_api_token = abc\n")
            .await
            .expect("write");

        let content = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(content, "dns_cloudflare_api_token = abc\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
