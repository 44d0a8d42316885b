//! Client configuration
//!
//! YAML file with environment and command-line overrides. The CSRF token
//! is the client-side analog of the page's csrf-token meta tag: sync
//! triggers refuse to run without it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/cropctl.yaml";

/// What to do when a statistics/record read fails
///
/// The dashboard historically swallowed read errors and kept showing stale
/// data; this makes that policy an explicit choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReadFailurePolicy {
    /// Log the failure and keep the previous state (original behavior)
    #[default]
    Suppress,
    /// Report the failure to the user
    Surface,
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    /// Base URL of the sync service
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Token sent in the X-CSRF-TOKEN header on sync POSTs
    #[serde(default)]
    pub csrf_token: Option<String>,
    /// Read-path failure handling
    #[serde(default)]
    pub read_failure_policy: ReadFailurePolicy,
}

fn default_server_url() -> String {
    "http://127.0.0.1:6010".to_string()
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let config: ClientConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Load from an explicit path, CROPCTL_CONFIG, the default path, or
    /// defaults; then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit {
            Self::from_file(path)?
        } else if let Ok(path) = std::env::var("CROPCTL_CONFIG") {
            Self::from_file(path)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self {
                server_url: default_server_url(),
                ..Default::default()
            }
        };

        if let Ok(url) = std::env::var("CROPCTL_SERVER") {
            config.server_url = url;
        }
        if let Ok(token) = std::env::var("CROPCTL_TOKEN") {
            config.csrf_token = Some(token);
        }
        if config.server_url.is_empty() {
            config.server_url = default_server_url();
        }

        Ok(config)
    }
}
