//! App configuration (`<config dir>/config.toml`)
//!
//! ```toml
//! region = "eu-west-1"
//! account_id = "123456789012"
//!
//! [reconcile]
//! stabilization_delay_seconds = 2
//!
//! [service]
//! deletion_polls = 3
//! ```

use crate::paths;
use anyhow::{Context, Result};
use glue_trigger::ReconcileConfig;
use glue_trigger::service::MemoryOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_ACCOUNT: &str = "123456789012";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Region the local triggers live in
    pub region: String,
    pub account_id: String,
    pub reconcile: ReconcileConfig,
    /// Behavior of the local trigger store
    pub service: MemoryOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            account_id: DEFAULT_ACCOUNT.to_string(),
            reconcile: ReconcileConfig::default(),
            service: MemoryOptions::default(),
        }
    }
}

impl AppConfig {
    /// Load from the config directory, or defaults if there is no file
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "region = \"cn-north-1\"\n\n[reconcile]\nstabilization_delay_seconds = 2\n\n[service]\ndeletion_polls = 3\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.region, "cn-north-1");
        assert_eq!(config.account_id, DEFAULT_ACCOUNT);
        assert_eq!(config.reconcile.stabilization_delay_seconds, 2);
        assert_eq!(config.reconcile.max_stabilization_attempts, 60);
        assert_eq!(config.service.deletion_polls, 3);
        assert_eq!(config.service.page_size, 50);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "region = [").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid TOML"));
    }
}
