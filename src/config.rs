//! Kiosk configuration.
//!
//! Loaded from `conf.toml` next to the binary (same file name the backend
//! uses). Every field has a workable default, so a missing file is not an
//! error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "conf.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the kiosk backend.
    pub server_url: String,
    /// Scale polling interval in milliseconds.
    pub scale_poll_ms: u64,
    /// Idle time before focus snaps back to the entry field, milliseconds.
    pub focus_return_ms: u64,
    /// Directory spreadsheet exports are written to.
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000/api/v1".to_string(),
            scale_poll_ms: 1000,
            focus_return_ms: 1000,
            download_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid configuration")
    }

    /// Read configuration from a file. A missing file yields the defaults;
    /// an unreadable or malformed file is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("[config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content)
    }
}
