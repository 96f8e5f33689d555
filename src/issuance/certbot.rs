use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use super::{
    artifacts::ArtifactSet,
    issuer::{CertificateIssuer, IssueRequest, IssuerError},
};
use crate::{
    core::scratch::{ScratchLayout, dir_arg},
    domain::lineage_name,
};

pub const DEFAULT_CERTBOT_BIN: &str = "certbot";

/// Overrides the certbot executable, e.g. when a layer installs it off `PATH`.
pub const ENV_CERTBOT_BIN: &str = "certbot_bin";

const STDERR_TAIL_LINES: usize = 20;

/// Runs the certbot CLI with the Cloudflare DNS plugin.
pub struct CertbotIssuer {
    program: String,
    layout: ScratchLayout,
}

impl CertbotIssuer {
    pub fn new(program: impl Into<String>, layout: ScratchLayout) -> Self {
        Self {
            program: program.into(),
            layout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Non-interactive `certonly` arguments; certbot's own paths are redirected into scratch.
    pub fn command_args(&self, request: &IssueRequest) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "certonly".into(),
            "-n".into(),
            "--agree-tos".into(),
            "--email".into(),
            request.email.clone(),
            "--dns-cloudflare".into(),
            "--dns-cloudflare-credentials".into(),
            request.credentials_path.display().to_string(),
            "-d".into(),
            request.domains.clone(),
            "--config-dir".into(),
            dir_arg(&self.layout.config_dir()),
            "--work-dir".into(),
            dir_arg(&self.layout.work_dir()),
            "--logs-dir".into(),
            dir_arg(&self.layout.logs_dir()),
        ];
        if request.test_cert {
            args.push("--test-cert".into());
        }
        args
    }
}

#[async_trait]
impl CertificateIssuer for CertbotIssuer {
    async fn issue(&self, request: &IssueRequest) -> Result<ArtifactSet, IssuerError> {
        let args = self.command_args(request);
        info!(
            "[certbot] requesting certificate for {} (staging: {})",
            request.domains, request.test_cert
        );
        debug!("[certbot] {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                IssuerError::Unavailable(format!("failed to execute {}: {}", self.program, e))
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("[certbot] {}", line);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IssuerError::Operation(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr_tail(&stderr, STDERR_TAIL_LINES)
            )));
        }

        let artifacts =
            ArtifactSet::new(self.layout.live_dir(&lineage_name(&request.primary_domain)));
        info!(
            "[certbot] certificate issued into {}",
            artifacts.dir().display()
        );
        Ok(artifacts)
    }
}

fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
