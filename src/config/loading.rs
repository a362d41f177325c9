//! Configuration loading functionality.
//!
//! Handles locating the configuration file, creating it on first run,
//! parsing and applying defaults.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::common::constants::*;
use crate::common::utils::private_path;

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
/// Returns an error if already set.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
/// Returns None if using the default directory.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Get the configuration file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("themeshift").join(CONFIG_FILE_NAME))
}

/// Load configuration using automatic path detection.
///
/// This function will create a default configuration file if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
        log_block_start!(
            "Created default configuration: {}",
            private_path(&config_path)
        );
    }

    load_from_path(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            private_path(&config_path)
        )
    })
}

/// Load configuration from a specific path.
///
/// This version does NOT create a default config if the path doesn't exist.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found at {}", private_path(path));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    validate_config(&config)?;
    apply_defaults(&mut config);

    Ok(config)
}

/// Apply default values to configuration fields.
///
/// Coordinates, the location label and the location command have no
/// default; leaving them unset selects the HTTP lookup.
pub(crate) fn apply_defaults(config: &mut Config) {
    config.enabled.get_or_insert(DEFAULT_ENABLED);
    config.poll_interval.get_or_insert(DEFAULT_POLL_INTERVAL);
    config
        .location_refresh_interval
        .get_or_insert(DEFAULT_LOCATION_REFRESH_INTERVAL);
    config.change_threshold.get_or_insert(DEFAULT_CHANGE_THRESHOLD);
    config.location_timeout.get_or_insert(DEFAULT_LOCATION_TIMEOUT);
    config.apply_timeout.get_or_insert(DEFAULT_APPLY_TIMEOUT);
    config
        .fallback_sunrise
        .get_or_insert_with(|| DEFAULT_FALLBACK_SUNRISE.to_string());
    config
        .fallback_sunset
        .get_or_insert_with(|| DEFAULT_FALLBACK_SUNSET.to_string());
    config
        .location_url
        .get_or_insert_with(|| DEFAULT_LOCATION_URL.to_string());
    config
        .dark_command
        .get_or_insert_with(|| DEFAULT_DARK_COMMAND.to_string());
    config
        .light_command
        .get_or_insert_with(|| DEFAULT_LIGHT_COMMAND.to_string());
    config.notifications.get_or_insert(DEFAULT_NOTIFICATIONS);
}
