use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use super::artifacts::ArtifactSet;

/// Obtains a certificate for a domain list and reports where the artifacts landed.
#[async_trait]
pub trait CertificateIssuer: Send + Sync {
    async fn issue(&self, request: &IssueRequest) -> Result<ArtifactSet, IssuerError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    /// Comma-separated list, passed through unchanged.
    pub domains: String,
    pub primary_domain: String,
    pub email: String,
    /// DNS plugin credential file already present on local disk.
    pub credentials_path: PathBuf,
    /// Use the CA's staging environment.
    pub test_cert: bool,
}

#[derive(Error, Debug)]
pub enum IssuerError {
    #[error("issuer unavailable: {0}")]
    Unavailable(String),
    #[error("issuer operation failed: {0}")]
    Operation(String),
    #[error("issued artifacts missing from {dir}: {}", .missing.join(", "))]
    MissingArtifacts { dir: String, missing: Vec<String> },
}
