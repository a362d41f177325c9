//! Configuration system for themeshift.
//!
//! Settings live in `themeshift.toml` under `$XDG_CONFIG_HOME/themeshift/`
//! (or the directory passed with `--config`). A commented default file is
//! generated on first run.
//!
//! ```toml
//! #[Automation]
//! enabled = true                    # Switch themes automatically at sunrise and sunset
//! poll_interval = 60                # Seconds between schedule checks (5-3600)
//! location_refresh_interval = 21600 # Seconds between location lookups (60-604800)
//! change_threshold = 0.001          # Degrees a new location must move to replace the saved one (0-1)
//!
//! #[Commands]
//! dark_command = "gsettings set org.gnome.desktop.interface color-scheme 'prefer-dark'"
//! light_command = "gsettings set org.gnome.desktop.interface color-scheme 'default'"
//! ```
//!
//! Every field is optional; missing values fall back to the defaults in
//! `common::constants`. Values are range-checked by [`validation`] before the
//! config is handed to the rest of the program.

pub mod builder;
pub mod loading;
pub mod validation;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;
use std::time::Duration;

use crate::common::constants::*;
use crate::common::utils::format_coordinates;

// Re-export public API
pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Configuration structure for themeshift settings.
///
/// ## Configuration Categories
///
/// - **Automation**: `enabled`, `poll_interval`, `location_refresh_interval`, `change_threshold`
/// - **Timeouts**: `location_timeout`, `apply_timeout`
/// - **Fallback schedule**: `fallback_sunrise`, `fallback_sunset` (used while no location is known)
/// - **Location**: `latitude`, `longitude`, `location_label` (fixed position), `location_url`
///   or a `location_command` override
/// - **Commands**: `dark_command`, `light_command`
/// - **Notifications**: `notifications`
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Whether automatic switching starts enabled.
    ///
    /// This is the only setting that changes at runtime (through `themeshift toggle`).
    pub enabled: Option<bool>,
    pub poll_interval: Option<u64>,             // seconds between ticks
    pub location_refresh_interval: Option<u64>, // seconds between provider lookups
    pub change_threshold: Option<f64>,          // degrees
    pub location_timeout: Option<u64>,          // seconds
    pub apply_timeout: Option<u64>,             // seconds
    pub fallback_sunrise: Option<String>,       // HH:MM:SS local
    pub fallback_sunset: Option<String>,        // HH:MM:SS local

    /// Fixed coordinates. When both are set the location command is not used.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_label: Option<String>,

    /// ip-api compatible endpoint queried for the current position.
    pub location_url: Option<String>,
    /// Shell command printing ip-api style JSON, used instead of `location_url`.
    pub location_command: Option<String>,
    pub dark_command: Option<String>,
    pub light_command: Option<String>,

    /// Also send desktop notifications through `notify-send`.
    pub notifications: Option<bool>,
}

impl Config {
    /// Load configuration using the module's load function
    pub fn load() -> Result<Self> {
        load()
    }

    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(DEFAULT_ENABLED)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL))
    }

    pub fn location_refresh_interval(&self) -> Duration {
        Duration::from_secs(
            self.location_refresh_interval
                .unwrap_or(DEFAULT_LOCATION_REFRESH_INTERVAL),
        )
    }

    pub fn change_threshold(&self) -> f64 {
        self.change_threshold.unwrap_or(DEFAULT_CHANGE_THRESHOLD)
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout.unwrap_or(DEFAULT_LOCATION_TIMEOUT))
    }

    pub fn apply_timeout(&self) -> Duration {
        Duration::from_secs(self.apply_timeout.unwrap_or(DEFAULT_APPLY_TIMEOUT))
    }

    /// Local wall-clock times of the fallback schedule.
    pub fn fallback_times(&self) -> Result<(NaiveTime, NaiveTime)> {
        let sunrise = parse_time(
            self.fallback_sunrise
                .as_deref()
                .unwrap_or(DEFAULT_FALLBACK_SUNRISE),
        )
        .context("Invalid fallback_sunrise. Use HH:MM:SS format")?;
        let sunset = parse_time(
            self.fallback_sunset
                .as_deref()
                .unwrap_or(DEFAULT_FALLBACK_SUNSET),
        )
        .context("Invalid fallback_sunset. Use HH:MM:SS format")?;
        Ok((sunrise, sunset))
    }

    /// Fixed coordinates, when both halves are configured.
    pub fn manual_coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn location_url(&self) -> String {
        self.location_url
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCATION_URL.to_string())
    }

    pub fn location_command(&self) -> Option<&str> {
        self.location_command.as_deref()
    }

    pub fn dark_command(&self) -> String {
        self.dark_command
            .clone()
            .unwrap_or_else(|| DEFAULT_DARK_COMMAND.to_string())
    }

    pub fn light_command(&self) -> String {
        self.light_command
            .clone()
            .unwrap_or_else(|| DEFAULT_LIGHT_COMMAND.to_string())
    }

    pub fn notifications(&self) -> bool {
        self.notifications.unwrap_or(DEFAULT_NOTIFICATIONS)
    }

    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");

        log_indented!(
            "Automation: {}",
            if self.enabled() { "enabled" } else { "paused" }
        );

        match self.manual_coordinates() {
            Some((lat, lon)) => {
                let label = self
                    .location_label
                    .as_deref()
                    .map(|label| format!("{label} "))
                    .unwrap_or_default();
                log_indented!("Location: {}({})", label, format_coordinates(lat, lon));
            }
            None => match self.location_command() {
                Some(_) => log_indented!("Location: automatic (command)"),
                None => log_indented!("Location: automatic ({})", self.location_url()),
            },
        }

        log_indented!(
            "Poll interval: {} seconds",
            self.poll_interval().as_secs()
        );
        log_indented!(
            "Location refresh: every {}",
            crate::common::utils::format_duration(self.location_refresh_interval().as_secs())
        );
        log_indented!("Change threshold: {}°", self.change_threshold());

        if let Ok((sunrise, sunset)) = self.fallback_times() {
            log_indented!(
                "Fallback schedule: light {} to {}",
                sunrise.format("%H:%M"),
                sunset.format("%H:%M")
            );
        }

        if self.notifications() {
            log_indented!("Desktop notifications: on");
        }
    }
}

/// Parse an `HH:MM:SS` time string.
pub(crate) fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .with_context(|| format!("'{value}' is not a valid HH:MM:SS time"))
}

#[cfg(test)]
mod tests;
