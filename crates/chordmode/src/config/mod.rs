//! Configuration module for chordmode.
//!
//! Handles loading and managing configuration from:
//! - Default values
//! - Config file (~/.config/chordmode/config.toml)
//! - Environment variables

mod keymap;
mod schema;

pub use keymap::{Binding, Keymap};
pub use schema::{Config, CustomKeyBinding, KeymapConfig, KeysConfig};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "CHORDMODE_CONFIG_DIR";

/// Returns the config directory path.
///
/// Checks `CHORDMODE_CONFIG_DIR` environment variable first, then falls back
/// to the system default (~/.config/chordmode on Linux).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|p| p.join("chordmode"))
}

/// Returns the default config file path (~/.config/chordmode/config.toml)
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Returns the directory log files go to (~/.config/chordmode/logs)
pub fn log_dir() -> Option<PathBuf> {
    config_dir().map(|p| p.join("logs"))
}

/// Load configuration from the default path or return defaults
pub fn load_config() -> Result<Config> {
    if let Some(path) = config_path() {
        if path.exists() {
            return load_config_from(&path);
        }
    }
    Ok(Config::default())
}

/// Load configuration from a specific path
pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "config_loaded");
    Ok(config)
}
