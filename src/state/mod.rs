//! State directory management, following XDG Base Directory standards.
//!
//! Runtime state (the saved location and the latest status snapshot) lives in
//! `XDG_STATE_HOME/themeshift/{namespace}`, keeping configuration and state
//! properly separated. Each config directory gets its own namespace so two
//! instances started with different `--config` paths never share state.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::common::constants::{LOCATION_FILE_NAME, STATUS_FILE_NAME};
use crate::config::get_custom_config_dir;

/// Get the state directory for a given configuration directory.
///
/// State is stored in XDG_STATE_HOME/themeshift/{namespace} where namespace is:
/// - "default" for the default config directory
/// - "custom_<hash>" for custom config directories (via --config)
pub fn get_state_dir(config_dir: Option<&Path>) -> Result<PathBuf> {
    let state_home = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });

    let state_base = state_home.join("themeshift");

    let namespace = match config_dir {
        None => "default".to_string(),
        Some(path) => {
            let default_config = dirs::config_dir()
                .context("Could not determine config directory")?
                .join("themeshift");
            if path == default_config {
                "default".to_string()
            } else {
                get_state_namespace(path)
            }
        }
    };

    Ok(state_base.join(namespace))
}

/// State directory for the config directory this process was started with.
pub fn current_state_dir() -> Result<PathBuf> {
    get_state_dir(get_custom_config_dir().as_deref())
}

/// Where the last known location is persisted.
pub fn location_path() -> Result<PathBuf> {
    Ok(current_state_dir()?.join(LOCATION_FILE_NAME))
}

/// Where the running instance publishes its status snapshot.
pub fn status_path() -> Result<PathBuf> {
    Ok(current_state_dir()?.join(STATUS_FILE_NAME))
}

/// Generate a stable namespace for a custom config directory.
fn get_state_namespace(config_path: &Path) -> String {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());

    // SHA256 truncated to 16 chars
    let hash = sha256::digest(canonical.to_string_lossy().as_bytes());
    format!("custom_{}", &hash[..16])
}
