use log::info;

use crate::{
    issuance::artifacts::ArtifactSet,
    storage::{ObjectStore, StorageError, UploadOptions, artifact_key},
};

/// Where a lineage is archived in the bucket.
pub struct ArchiveTarget<'a> {
    pub bucket: &'a str,
    pub s3_path: &'a str,
    pub primary_domain: &'a str,
}

/// Uploads each artifact in order, deleting the local file once it is stored.
///
/// Stops at the first failure; objects already uploaded stay in the bucket.
/// Returns the keys written.
pub async fn upload_artifacts(
    store: &dyn ObjectStore,
    artifacts: &ArtifactSet,
    target: ArchiveTarget<'_>,
) -> Result<Vec<String>, StorageError> {
    let options = UploadOptions {
        server_side_encryption: true,
    };
    let mut uploaded = Vec::new();

    for (filename, local_path) in artifacts.files() {
        let key = artifact_key(target.s3_path, target.primary_domain, filename);
        store
            .upload_file(&local_path, target.bucket, &key, options)
            .await?;
        tokio::fs::remove_file(&local_path)
            .await
            .map_err(|err| StorageError::io(&local_path, err))?;
        info!("[archive] {} uploaded", key);
        uploaded.push(key);
    }

    Ok(uploaded)
}
