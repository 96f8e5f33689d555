//! Invocation settings read from the Lambda environment.

use log::error;
use thiserror::Error;

use crate::domain::{DomainError, DomainList};

pub const ENV_DOMAINS: &str = "letsencrypt_domains";
pub const ENV_EMAIL: &str = "letsencrypt_email";
pub const ENV_S3_BUCKET: &str = "s3_bucket";
pub const ENV_S3_PATH: &str = "s3_path";
pub const ENV_TEST_CERT: &str = "test_cert";
pub const ENV_SNS_TOPIC_ARN: &str = "sns_topic_arn";

/// Logged whenever one of the required settings is absent.
pub const MISSING_SETTINGS_MESSAGE: &str = "LetsEncrypt Environment Variables not set.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("letsencrypt_domains is invalid: {0}")]
    Domains(#[from] DomainError),
}

/// Settings for one invocation, built once and passed to every step.
#[derive(Debug, Clone)]
pub struct Config {
    pub domains: DomainList,
    pub email: String,
    pub s3_bucket: String,
    pub s3_path: String,
    /// Absent or empty means the completion notice goes to stdout.
    pub sns_topic_arn: Option<String>,
    /// Any non-empty `test_cert` value selects the staging CA.
    pub test_cert: bool,
}

impl Config {
    /// Builds the settings from `lookup`, usually `|name| std::env::var(name).ok()`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = || -> Result<_, ConfigError> {
            Ok((
                require(&lookup, ENV_DOMAINS)?,
                require(&lookup, ENV_EMAIL)?,
                require(&lookup, ENV_S3_BUCKET)?,
                require(&lookup, ENV_S3_PATH)?,
            ))
        };
        let (raw_domains, email, s3_bucket, s3_path) =
            required().inspect_err(|_| error!("{MISSING_SETTINGS_MESSAGE}"))?;

        let domains = DomainList::parse(&raw_domains)
            .inspect_err(|err| error!("[config] {ENV_DOMAINS} rejected: {err}"))?;

        Ok(Self {
            domains,
            email,
            s3_bucket,
            s3_path,
            sns_topic_arn: lookup(ENV_SNS_TOPIC_ARN).filter(|value| !value.is_empty()),
            test_cert: lookup(ENV_TEST_CERT).is_some_and(|value| !value.is_empty()),
        })
    }
}

fn require<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or(ConfigError::Missing(name))
}
