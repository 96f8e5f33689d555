#![allow(dead_code)]

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;
use rcgen::{BasicConstraints, CertificateParams, IsCa, KeyPair};
use uuid::Uuid;

use certbot_dns_lambda_lib::{
    config::{ENV_DOMAINS, ENV_EMAIL, ENV_S3_BUCKET, ENV_S3_PATH},
    core::scratch::ScratchLayout,
    distribution::notify::{NotifyError, TopicPublisher},
    issuance::{
        ArtifactSet, CertificateIssuer, IssueRequest, IssuerError,
        artifacts::{CERT_FILENAME, CHAIN_FILENAME, FULLCHAIN_FILENAME, PRIVKEY_FILENAME},
    },
    storage::{ObjectStore, StorageError, UploadOptions},
};

pub const CREDENTIALS_BODY: &str = "dns_cloudflare_api_token = 0123456789abcdef\n";

pub fn scratch_layout() -> ScratchLayout {
    let root = std::env::temp_dir().join(format!("certbot-lambda-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create scratch root");
    ScratchLayout::new(root)
}

pub fn base_env() -> HashMap<String, String> {
    [
        (ENV_DOMAINS, "example.com,www.example.com"),
        (ENV_EMAIL, "ops@example.com"),
        (ENV_S3_BUCKET, "certs-bucket"),
        (ENV_S3_PATH, "letsencrypt"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Download {
        bucket: String,
        key: String,
        destination: PathBuf,
    },
    Upload {
        bucket: String,
        key: String,
        source: PathBuf,
        encrypted: bool,
        /// The local file existed when the upload started.
        source_present: bool,
    },
}

/// Records every call; optionally fails the download or the n-th upload (1-based).
#[derive(Default)]
pub struct RecordingStore {
    pub calls: Mutex<Vec<StoreCall>>,
    pub fail_download: bool,
    pub fail_upload_number: Option<usize>,
}

impl RecordingStore {
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::Upload { .. }))
            .collect()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn download_to_file(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<(), StorageError> {
        self.calls.lock().unwrap().push(StoreCall::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
            destination: destination.to_path_buf(),
        });
        if self.fail_download {
            return Err(StorageError::Download {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: "NoSuchKey".to_string(),
            });
        }
        fs::write(destination, CREDENTIALS_BODY).expect("write credentials");
        Ok(())
    }

    async fn upload_file(
        &self,
        source: &Path,
        bucket: &str,
        key: &str,
        options: UploadOptions,
    ) -> Result<(), StorageError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(StoreCall::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source: source.to_path_buf(),
            encrypted: options.server_side_encryption,
            source_present: source.is_file(),
        });
        let upload_number = calls
            .iter()
            .filter(|call| matches!(call, StoreCall::Upload { .. }))
            .count();
        if self.fail_upload_number == Some(upload_number) {
            return Err(StorageError::Upload {
                path: source.to_path_buf(),
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: "AccessDenied".to_string(),
            });
        }
        Ok(())
    }
}

/// Stands in for certbot by writing a signed lineage into the live directory.
pub struct FakeIssuer {
    pub layout: ScratchLayout,
    pub requests: Mutex<Vec<IssueRequest>>,
    pub fail: bool,
    /// Leave `chain.pem` out of the lineage.
    pub skip_chain: bool,
}

impl FakeIssuer {
    pub fn new(layout: ScratchLayout) -> Self {
        Self {
            layout,
            requests: Mutex::new(Vec::new()),
            fail: false,
            skip_chain: false,
        }
    }

    pub fn requests(&self) -> Vec<IssueRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CertificateIssuer for FakeIssuer {
    async fn issue(&self, request: &IssueRequest) -> Result<ArtifactSet, IssuerError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(IssuerError::Operation(
                "certbot exited with exit status: 1: DNS problem".to_string(),
            ));
        }
        let dir = self.layout.live_dir(&request.primary_domain);
        write_lineage(&dir, &request.primary_domain, self.skip_chain);
        Ok(ArtifactSet::new(dir))
    }
}

pub fn write_lineage(dir: &Path, domain: &str, skip_chain: bool) {
    fs::create_dir_all(dir).expect("create live dir");

    let mut ca_params =
        CertificateParams::new(vec!["ca.example.net".to_string()]).expect("ca params");
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let ca_key = KeyPair::generate().expect("ca key");
    let ca = ca_params.self_signed(&ca_key).expect("create ca cert");

    let leaf_params = CertificateParams::new(vec![domain.to_string()]).expect("leaf params");
    let leaf_key = KeyPair::generate().expect("leaf key");
    let leaf = leaf_params
        .signed_by(&leaf_key, &ca, &ca_key)
        .expect("create leaf cert");

    fs::write(dir.join(FULLCHAIN_FILENAME), format!("{}{}", leaf.pem(), ca.pem()))
        .expect("fullchain");
    fs::write(dir.join(PRIVKEY_FILENAME), leaf_key.serialize_pem()).expect("privkey");
    fs::write(dir.join(CERT_FILENAME), leaf.pem()).expect("cert");
    if !skip_chain {
        fs::write(dir.join(CHAIN_FILENAME), ca.pem()).expect("chain");
    }
}

#[derive(Default)]
pub struct FakePublisher {
    pub fail: bool,
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl TopicPublisher for FakePublisher {
    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((
            topic_arn.to_string(),
            subject.to_string(),
            message.to_string(),
        ));
        if self.fail {
            return Err(NotifyError::Publish {
                topic_arn: topic_arn.to_string(),
                reason: "AuthorizationError".to_string(),
            });
        }
        Ok(())
    }
}
