use std::io::Write;

use log::{info, warn};
use thiserror::Error;

use super::{scratch::ScratchLayout, types::InvocationSummary};
use crate::{
    config::{Config, ConfigError},
    distribution::{
        archive::{ArchiveTarget, upload_artifacts},
        notify::{TopicPublisher, notify_completion},
    },
    issuance::issuer::{CertificateIssuer, IssueRequest, IssuerError},
    storage::{ObjectStore, StorageError, credentials_key},
};

/// External collaborators of one invocation.
pub struct Services<'a> {
    pub store: &'a dyn ObjectStore,
    pub issuer: &'a dyn CertificateIssuer,
    pub publisher: &'a dyn TopicPublisher,
}

#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to fetch DNS credentials: {0}")]
    Credentials(#[source] StorageError),
    #[error("certificate issuance failed: {0}")]
    Issuance(#[from] IssuerError),
    #[error("certificate upload failed: {0}")]
    Upload(#[source] StorageError),
}

/// Loads the configuration, then runs the issuance sequence.
///
/// Nothing in `services` is touched when the configuration is incomplete.
pub async fn run_invocation<F, W>(
    lookup: F,
    services: &Services<'_>,
    layout: &ScratchLayout,
    out: &mut W,
) -> Result<InvocationSummary, InvocationError>
where
    F: Fn(&str) -> Option<String>,
    W: Write + Send + ?Sized,
{
    let config = Config::from_lookup(lookup)?;
    execute(&config, services, layout, out).await
}

/// Fetch credentials, issue, archive, notify. Each step must succeed before the next.
///
/// All four artifacts must exist before the first upload: an incomplete lineage
/// fails as an issuance error with nothing archived. Once uploading starts, the
/// first failed upload aborts the rest and earlier objects stay in place.
pub async fn execute<W>(
    config: &Config,
    services: &Services<'_>,
    layout: &ScratchLayout,
    out: &mut W,
) -> Result<InvocationSummary, InvocationError>
where
    W: Write + Send + ?Sized,
{
    let primary_domain = config.domains.primary();
    info!(
        "[invocation] issuing certificates for {} (primary {})",
        config.domains, primary_domain
    );

    let credentials_path = layout.credentials_path();
    services
        .store
        .download_to_file(
            &config.s3_bucket,
            &credentials_key(&config.s3_path),
            &credentials_path,
        )
        .await
        .map_err(InvocationError::Credentials)?;

    let request = IssueRequest {
        domains: config.domains.as_str().to_string(),
        primary_domain: primary_domain.to_string(),
        email: config.email.clone(),
        credentials_path,
        test_cert: config.test_cert,
    };
    let artifacts = services.issuer.issue(&request).await?;
    artifacts.ensure_complete().await?;

    let certificate = match artifacts.inspect().await {
        Ok(summary) => {
            info!(
                "[invocation] issued serial {} by {}, valid until {}",
                summary.serial,
                summary.issuer,
                summary.not_after.to_rfc3339()
            );
            Some(summary)
        }
        Err(err) => {
            warn!("[invocation] could not inspect issued certificate: {:#}", err);
            None
        }
    };

    let uploaded = upload_artifacts(
        services.store,
        &artifacts,
        ArchiveTarget {
            bucket: &config.s3_bucket,
            s3_path: &config.s3_path,
            primary_domain,
        },
    )
    .await
    .map_err(InvocationError::Upload)?;

    let notification = notify_completion(
        services.publisher,
        config.sns_topic_arn.as_deref(),
        config.domains.as_str(),
        out,
    )
    .await;

    Ok(InvocationSummary {
        domains: config.domains.as_str().to_string(),
        primary_domain: primary_domain.to_string(),
        staging: config.test_cert,
        uploaded,
        notification,
        certificate,
    })
}
