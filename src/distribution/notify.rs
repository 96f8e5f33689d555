use std::io::Write;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::{Client, error::DisplayErrorContext};
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

pub const NOTIFICATION_SUBJECT: &str = "CERBOT_CLOUDFLARE - ";
const MESSAGE_PREFIX: &str = "Issued new certificates for domains: ";

#[async_trait]
pub trait TopicPublisher: Send + Sync {
    async fn publish(&self, topic_arn: &str, subject: &str, message: &str)
    -> Result<(), NotifyError>;
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to publish to {topic_arn}: {reason}")]
    Publish { topic_arn: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationOutcome {
    Published,
    /// Publishing failed and was ignored.
    Suppressed,
    /// No topic configured; the notice went to stdout.
    Printed,
}

pub struct SnsPublisher {
    client: Client,
}

impl SnsPublisher {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl TopicPublisher for SnsPublisher {
    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        self.client
            .publish()
            .topic_arn(topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|err| NotifyError::Publish {
                topic_arn: topic_arn.to_string(),
                reason: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }
}

pub fn completion_message(domains: &str) -> String {
    format!("{MESSAGE_PREFIX}{domains}")
}

/// The line printed when no topic is configured.
pub fn stdout_notice(domains: &str) -> String {
    format!("{NOTIFICATION_SUBJECT}{}", completion_message(domains))
}

/// Announces the issued certificates. Never fails: delivery is best-effort.
pub async fn notify_completion<W>(
    publisher: &dyn TopicPublisher,
    topic_arn: Option<&str>,
    domains: &str,
    out: &mut W,
) -> NotificationOutcome
where
    W: Write + Send + ?Sized,
{
    let Some(topic_arn) = topic_arn else {
        if let Err(err) = writeln!(out, "{}", stdout_notice(domains)) {
            warn!("[notify] failed to write completion notice: {}", err);
        }
        return NotificationOutcome::Printed;
    };

    let message = completion_message(domains);
    // Every publish error is dropped here, malformed topic ARNs included.
    match publisher
        .publish(topic_arn, NOTIFICATION_SUBJECT, &message)
        .await
    {
        Ok(()) => {
            info!("[notify] published completion notice to {}", topic_arn);
            NotificationOutcome::Published
        }
        Err(err) => {
            warn!("[notify] best-effort notification ignored: {}", err);
            NotificationOutcome::Suppressed
        }
    }
}
