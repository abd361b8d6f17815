//! Path resolution for glue-trigger
//!
//! # Environment Variables
//!
//! - `GLUE_TRIGGER_CONFIG_DIR` - Override config directory
//! - `GLUE_TRIGGER_STATE_DIR` - Override state directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `GLUE_TRIGGER_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/glue-trigger` (if set)
//! 3. `~/.config/glue-trigger`
//!
//! For state_dir():
//! 1. `GLUE_TRIGGER_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/glue-trigger` (if set)
//! 3. `~/.local/state/glue-trigger`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "glue-trigger";

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "GLUE_TRIGGER_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "GLUE_TRIGGER_STATE_DIR";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    resolve(
        std::env::var(ENV_CONFIG_DIR).ok().as_deref(),
        std::env::var("XDG_CONFIG_HOME").ok().as_deref(),
        &[".config"],
    )
}

/// Get the state directory path
pub fn state_dir() -> Result<PathBuf> {
    resolve(
        std::env::var(ENV_STATE_DIR).ok().as_deref(),
        std::env::var("XDG_STATE_HOME").ok().as_deref(),
        &[".local", "state"],
    )
}

/// Path of the app config file
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Pick a directory from an explicit override, an XDG base, or the home
/// directory, in that order
fn resolve(overridden: Option<&str>, xdg: Option<&str>, home_parts: &[&str]) -> Result<PathBuf> {
    if let Some(dir) = overridden.filter(|d| !d.is_empty()) {
        let path = expand(dir);
        log::debug!("Using directory override: {}", path.display());
        return Ok(path);
    }

    if let Some(base) = xdg.filter(|d| !d.is_empty()) {
        let path = PathBuf::from(base).join(APP_DIR);
        log::debug!("Using XDG directory: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = under_home(&home, home_parts);
    log::debug!("Using default directory: {}", path.display());
    Ok(path)
}

fn under_home(home: &Path, parts: &[&str]) -> PathBuf {
    parts
        .iter()
        .fold(home.to_path_buf(), |path, part| path.join(part))
        .join(APP_DIR)
}

/// Expand `~` and environment variables in a path string
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
