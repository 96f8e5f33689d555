use std::path::{Path, PathBuf};

/// Lambda only allows writes under `/tmp`.
pub const DEFAULT_SCRATCH_ROOT: &str = "/tmp";

const CREDENTIALS_FILENAME: &str = "cloudflare.ini";
const CONFIG_DIR: &str = "config-dir";
const WORK_DIR: &str = "work-dir";
const LOGS_DIR: &str = "logs-dir";
const LIVE_DIR: &str = "live";

/// Fixed local paths used by one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchLayout {
    root: PathBuf,
}

impl Default for ScratchLayout {
    fn default() -> Self {
        Self::new(DEFAULT_SCRATCH_ROOT)
    }
}

impl ScratchLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.root.join(CREDENTIALS_FILENAME)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join(CONFIG_DIR)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.join(WORK_DIR)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    /// Where certbot links the current artifacts of a lineage.
    pub fn live_dir(&self, primary_domain: &str) -> PathBuf {
        self.config_dir().join(LIVE_DIR).join(primary_domain)
    }
}

/// Renders a directory argument with a trailing separator, as certbot is given it.
pub fn dir_arg(path: &Path) -> String {
    let rendered = path.display().to_string();
    if rendered.ends_with('/') {
        rendered
    } else {
        format!("{rendered}/")
    }
}
