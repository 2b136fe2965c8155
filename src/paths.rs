//! Path resolution for the provider's config and state files
//!
//! # Environment Variables
//!
//! - `LATITUDE_CONFIG_DIR` - Override config directory
//! - `LATITUDE_STATE_DIR` - Override state directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `LATITUDE_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/latitude` (if set)
//! 3. `~/.config/latitude`
//!
//! For state_dir():
//! 1. `LATITUDE_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/latitude` (if set)
//! 3. `~/.local/state/latitude`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "LATITUDE_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "LATITUDE_STATE_DIR";

const APP_DIR: &str = "latitude";

fn resolve(override_var: &str, xdg_var: &str, fallback: &[&str]) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(override_var) {
        let path = expand(&dir);
        log::debug!("Using {} from {}", path.display(), override_var);
        return Ok(path);
    }

    if let Ok(xdg) = std::env::var(xdg_var) {
        let path = PathBuf::from(xdg).join(APP_DIR);
        log::debug!("Using {}: {}", xdg_var, path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = fallback.iter().fold(home, |path, part| path.join(part)).join(APP_DIR);
    log::debug!("Using default dir: {}", path.display());
    Ok(path)
}

/// Directory holding `config.toml`
pub fn config_dir() -> Result<PathBuf> {
    resolve(ENV_CONFIG_DIR, "XDG_CONFIG_HOME", &[".config"])
}

/// Directory holding the default state file
pub fn state_dir() -> Result<PathBuf> {
    resolve(ENV_STATE_DIR, "XDG_STATE_HOME", &[".local", "state"])
}

/// Expand ~ and environment variables in a path string
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
