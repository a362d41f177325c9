//! Default config file generation.
//!
//! The generated file lists every setting with its default and a comment
//! describing the accepted range, aligned into one column.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;

/// Create a default config file at `path`.
///
/// Coordinates are left commented out so the location command is used until
/// the user pins a position.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let config_content = ConfigBuilder::new()
        .add_section("Automation")
        .add_setting(
            "enabled",
            &DEFAULT_ENABLED.to_string(),
            "Switch themes automatically at sunrise and sunset",
        )
        .add_setting(
            "poll_interval",
            &DEFAULT_POLL_INTERVAL.to_string(),
            &format!(
                "Seconds between schedule checks ({MINIMUM_POLL_INTERVAL}-{MAXIMUM_POLL_INTERVAL})"
            ),
        )
        .add_setting(
            "location_refresh_interval",
            &DEFAULT_LOCATION_REFRESH_INTERVAL.to_string(),
            &format!(
                "Seconds between location lookups ({MINIMUM_LOCATION_REFRESH_INTERVAL}-{MAXIMUM_LOCATION_REFRESH_INTERVAL})"
            ),
        )
        .add_setting(
            "change_threshold",
            &DEFAULT_CHANGE_THRESHOLD.to_string(),
            "Degrees a new location must move to replace the saved one (0-1)",
        )
        .add_section("Timeouts")
        .add_setting(
            "location_timeout",
            &DEFAULT_LOCATION_TIMEOUT.to_string(),
            &format!("Seconds to wait for a location ({MINIMUM_TIMEOUT}-{MAXIMUM_TIMEOUT})"),
        )
        .add_setting(
            "apply_timeout",
            &DEFAULT_APPLY_TIMEOUT.to_string(),
            &format!("Seconds to wait for a theme command ({MINIMUM_TIMEOUT}-{MAXIMUM_TIMEOUT})"),
        )
        .add_section("Fallback schedule")
        .add_setting(
            "fallback_sunrise",
            &format!("\"{DEFAULT_FALLBACK_SUNRISE}\""),
            "Light theme start while no location is known (HH:MM:SS)",
        )
        .add_setting(
            "fallback_sunset",
            &format!("\"{DEFAULT_FALLBACK_SUNSET}\""),
            "Dark theme start while no location is known (HH:MM:SS)",
        )
        .add_section("Location")
        .add_commented_setting("latitude", "52.520000", "Fixed latitude (-90 to 90)")
        .add_commented_setting("longitude", "13.405000", "Fixed longitude (-180 to 180)")
        .add_commented_setting("location_label", "\"Berlin, Germany\"", "Name shown in status")
        .add_setting(
            "location_url",
            &format!("\"{DEFAULT_LOCATION_URL}\""),
            "ip-api compatible lookup",
        )
        .add_commented_setting(
            "location_command",
            "\"my-locator --json\"",
            "Prints ip-api style JSON instead of the lookup",
        )
        .add_section("Commands")
        .add_setting(
            "dark_command",
            &format!("\"{DEFAULT_DARK_COMMAND}\""),
            "Switches the desktop to dark",
        )
        .add_setting(
            "light_command",
            &format!("\"{DEFAULT_LIGHT_COMMAND}\""),
            "Switches the desktop to light",
        )
        .add_section("Notifications")
        .add_setting(
            "notifications",
            &DEFAULT_NOTIFICATIONS.to_string(),
            "Send desktop notifications with notify-send",
        )
        .build();

    fs::write(path, config_content).context("Failed to write default config file")?;
    Ok(())
}

/// Builder for creating properly formatted configuration files
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// Example setting that stays inactive until the user removes the `#`.
    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("#{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        // Settings wider than this keep a single space before their comment
        const ALIGN_LIMIT: usize = 40;

        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } if line.len() < ALIGN_LIMIT => Some(line.len()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width.saturating_sub(line.len()).max(1));
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.push(String::new());
        result.join("\n")
    }
}
