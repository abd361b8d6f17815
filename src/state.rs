use crate::paths;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use glue_trigger::service::TriggerStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "triggers.toml";

/// Local trigger store persisted between runs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LocalState {
    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,

    #[serde(default)]
    pub store: TriggerStore,
}

impl Default for LocalState {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            store: TriggerStore::default(),
        }
    }
}

impl LocalState {
    /// Get the state file path
    pub fn state_file() -> Result<PathBuf> {
        Ok(paths::state_dir()?.join(STATE_FILE))
    }

    /// Load state from disk, or return default if file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!(
            "Loaded {} trigger(s) from {}",
            state.store.triggers.len(),
            path.display()
        );
        Ok(state)
    }

    /// Save state to disk
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;
        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Replace the store, update the timestamp and save
    pub fn commit(&mut self, store: TriggerStore, path: &Path) -> Result<()> {
        self.store = store;
        self.last_updated = Utc::now();
        self.save_to(path)
    }
}
