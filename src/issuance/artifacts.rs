use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::fs;
use x509_parser::pem::parse_x509_pem;

use super::issuer::IssuerError;

pub const FULLCHAIN_FILENAME: &str = "fullchain.pem";
pub const PRIVKEY_FILENAME: &str = "privkey.pem";
pub const CERT_FILENAME: &str = "cert.pem";
pub const CHAIN_FILENAME: &str = "chain.pem";

/// Upload order of the files certbot writes for a lineage.
pub const ARTIFACT_FILENAMES: [&str; 4] = [
    FULLCHAIN_FILENAME,
    PRIVKEY_FILENAME,
    CERT_FILENAME,
    CHAIN_FILENAME,
];

/// The four PEM files of one issued certificate, as laid out by certbot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    dir: PathBuf,
}

/// Details of the issued leaf certificate, reported in the invocation result.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    /// SHA-256 over the DER encoding, hex.
    pub fingerprint: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// Certificates in `fullchain.pem`, leaf included.
    pub chain_length: usize,
}

impl ArtifactSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filenames paired with their local paths, in upload order.
    pub fn files(&self) -> impl Iterator<Item = (&'static str, PathBuf)> + '_ {
        ARTIFACT_FILENAMES
            .into_iter()
            .map(move |name| (name, self.dir.join(name)))
    }

    pub async fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for (name, path) in self.files() {
            let present = fs::metadata(&path)
                .await
                .is_ok_and(|metadata| metadata.is_file());
            if !present {
                missing.push(name.to_string());
            }
        }
        missing
    }

    pub async fn ensure_complete(&self) -> Result<(), IssuerError> {
        let missing = self.missing().await;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(IssuerError::MissingArtifacts {
                dir: self.dir.display().to_string(),
                missing,
            })
        }
    }

    pub async fn inspect(&self) -> Result<CertificateSummary> {
        let cert_path = self.dir.join(CERT_FILENAME);
        let cert_pem = fs::read(&cert_path)
            .await
            .with_context(|| format!("failed to read {}", cert_path.display()))?;
        let (_, pem_block) = parse_x509_pem(&cert_pem)
            .map_err(|e| anyhow!("failed to parse issued certificate PEM: {e}"))?;
        let cert = pem_block.parse_x509().map_err(|e| anyhow!(e.to_string()))?;

        let not_before = Utc
            .timestamp_opt(cert.validity().not_before.timestamp(), 0)
            .single()
            .ok_or_else(|| anyhow!("certificate notBefore out of range"))?;
        let not_after = Utc
            .timestamp_opt(cert.validity().not_after.timestamp(), 0)
            .single()
            .ok_or_else(|| anyhow!("certificate notAfter out of range"))?;
        let fingerprint = {
            let mut hasher = Sha256::new();
            hasher.update(&pem_block.contents);
            hex::encode(hasher.finalize())
        };

        let fullchain_path = self.dir.join(FULLCHAIN_FILENAME);
        let fullchain = fs::read_to_string(&fullchain_path)
            .await
            .with_context(|| format!("failed to read {}", fullchain_path.display()))?;
        let chain_length = pem::parse_many(&fullchain)
            .map_err(|err| anyhow!("failed to parse certificate chain PEM: {err}"))?
            .iter()
            .filter(|block| block.tag() == "CERTIFICATE")
            .count();

        Ok(CertificateSummary {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: cert.raw_serial_as_string(),
            fingerprint,
            not_before,
            not_after,
            chain_length,
        })
    }
}
