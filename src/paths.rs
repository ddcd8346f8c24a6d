//! Path resolution for nodeprep
//!
//! # Environment Variables
//!
//! - `NODEPREP_CONFIG_DIR` - Override config directory
//! - `NODEPREP_INVENTORY` - Inventory file (read by the CLI `--inventory` flag)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `NODEPREP_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/nodeprep` (if set)
//! 3. `~/.config/nodeprep`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "NODEPREP_CONFIG_DIR";

/// Inventory file name inside the config directory
pub const INVENTORY_FILE: &str = "inventory.toml";

/// Get the nodeprep config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("nodeprep");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("nodeprep");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Inventory to use: the explicit path if given, else the default location
pub fn inventory_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(&path.to_string_lossy())),
        None => Ok(config_dir()?.join(INVENTORY_FILE)),
    }
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
