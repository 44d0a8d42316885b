//! Configuration management for the Synchronization Service
//!
//! YAML-based configuration with defaults, environment override
//! (CONFIG_FILE) and validation.
//!
//! ### Configuration file example
//!
//! ```yaml
//! service:
//!   name: "syncsrv"
//!   description: "Crop record synchronization"
//!
//! api:
//!   host: "0.0.0.0"
//!   port: 6010
//!
//! database:
//!   path: "data/cropsync.db"
//!
//! sheets:
//!   dir: "config/sheets"
//!
//! barangays:
//!   - "Bagong Silang"
//!   - "San Isidro"
//!   - "Poblacion"
//!
//! security:
//!   csrf_token: "change-me"
//!
//! log:
//!   level: "info"
//! ```

use crate::error::{Result, SyncSrvError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/syncsrv.yaml";

/// Service identity section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    /// Service name used for logging and health reporting
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
}

/// API server section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

/// SQLite storage section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// Database file path, or ":memory:" for an ephemeral store
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Spreadsheet source section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsSection {
    /// Directory holding one CSV export per barangay
    #[serde(default = "default_sheets_dir")]
    pub dir: String,
}

/// Security section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySection {
    /// Token required in the X-CSRF-TOKEN header on sync POSTs
    #[serde(default)]
    pub csrf_token: String,
}

/// Logging section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSrvConfig {
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub sheets: SheetsSection,
    /// Known barangays; declaration order is the sync/report order
    #[serde(default = "default_barangays")]
    pub barangays: Vec<String>,
    #[serde(default)]
    pub security: SecuritySection,
    #[serde(default)]
    pub log: LogSection,
}

fn default_service_name() -> String {
    "syncsrv".to_string()
}

fn default_api_host() -> String {
    common::DEFAULT_API_HOST.to_string()
}

fn default_api_port() -> u16 {
    6010
}

fn default_database_path() -> String {
    "data/cropsync.db".to_string()
}

fn default_sheets_dir() -> String {
    "config/sheets".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_barangays() -> Vec<String> {
    vec![
        "Bagong Silang".to_string(),
        "San Isidro".to_string(),
        "Poblacion".to_string(),
    ]
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            description: None,
        }
    }
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            dir: default_sheets_dir(),
        }
    }
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            csrf_token: String::new(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

impl Default for SyncSrvConfig {
    fn default() -> Self {
        Self {
            service: ServiceSection::default(),
            api: ApiSection::default(),
            database: DatabaseSection::default(),
            sheets: SheetsSection::default(),
            barangays: default_barangays(),
            security: SecuritySection::default(),
            log: LogSection::default(),
        }
    }
}

impl SyncSrvConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncSrvError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: SyncSrvConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from CONFIG_FILE, the default path, or defaults
    pub fn load() -> Result<Self> {
        if let Ok(config_file) = std::env::var("CONFIG_FILE") {
            return Self::from_file(config_file);
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::from_file(DEFAULT_CONFIG_PATH);
        }
        Ok(Self::default())
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.port == 0 {
            return Err(SyncSrvError::config("api.port must be non-zero"));
        }

        if self.barangays.is_empty() {
            return Err(SyncSrvError::config(
                "barangays list must name at least one region",
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.barangays {
            if name.trim().is_empty() {
                return Err(SyncSrvError::config("barangay names must be non-empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(SyncSrvError::config(format!(
                    "duplicate barangay in configuration: {}",
                    name
                )));
            }
        }

        if self.security.csrf_token.trim().is_empty() {
            return Err(SyncSrvError::config(
                "security.csrf_token must be set; sync POSTs are rejected without it",
            ));
        }

        Ok(())
    }

    /// SQLite connection URL for the configured database path
    pub fn database_url(&self) -> String {
        if self.database.path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", self.database.path)
        }
    }

    /// Check whether a barangay is part of the configured region set
    pub fn knows_barangay(&self, name: &str) -> bool {
        self.barangays.iter().any(|b| b == name)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_default_config_fails_without_token() {
        let config = SyncSrvConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_valid_with_token() {
        let mut config = SyncSrvConfig::default();
        config.security.csrf_token = "secret".to_string();
        config.validate().expect("defaults should validate");
        assert_eq!(config.barangays.len(), 3);
    }

    #[test]
    fn test_duplicate_barangay_rejected() {
        let mut config = SyncSrvConfig::default();
        config.security.csrf_token = "secret".to_string();
        config.barangays = vec!["Poblacion".to_string(), "Poblacion".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
api:
  port: 7000
barangays:
  - "Alpha"
  - "Beta"
security:
  csrf_token: "tok"
"#;
        let config: SyncSrvConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.port, 7000);
        assert_eq!(config.api.host, common::DEFAULT_API_HOST);
        assert_eq!(config.barangays, vec!["Alpha", "Beta"]);
        assert!(config.knows_barangay("Alpha"));
        assert!(!config.knows_barangay("Gamma"));
        config.validate().unwrap();
    }

    #[test]
    fn test_memory_database_url() {
        let mut config = SyncSrvConfig::default();
        config.database.path = ":memory:".to_string();
        assert_eq!(config.database_url(), "sqlite::memory:");
    }
}
