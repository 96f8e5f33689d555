pub mod artifacts;
pub mod certbot;
pub mod issuer;

pub use artifacts::{ArtifactSet, CertificateSummary};
pub use certbot::CertbotIssuer;
pub use issuer::{CertificateIssuer, IssueRequest, IssuerError};
