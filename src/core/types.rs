use serde::Serialize;

use crate::distribution::notify::NotificationOutcome;
use crate::issuance::artifacts::CertificateSummary;

/// Result of a successful invocation, returned to the Lambda runtime as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationSummary {
    /// Domain list exactly as configured.
    pub domains: String,
    pub primary_domain: String,
    /// Issued by the CA's staging environment.
    pub staging: bool,
    /// Object keys written, in upload order.
    pub uploaded: Vec<String>,
    pub notification: NotificationOutcome,
    /// Absent when the issued leaf could not be parsed.
    pub certificate: Option<CertificateSummary>,
}
