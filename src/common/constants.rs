//! Application-wide defaults and validation limits.
//!
//! Every configurable value has a `DEFAULT_*` constant used when the field is
//! missing from `themeshift.toml`, and numeric fields have `MINIMUM_*` /
//! `MAXIMUM_*` bounds enforced by `config::validation`.

// # Automation defaults

pub const DEFAULT_ENABLED: bool = true;
pub const DEFAULT_POLL_INTERVAL: u64 = 60; // seconds between ticks
pub const DEFAULT_LOCATION_REFRESH_INTERVAL: u64 = 6 * 60 * 60; // seconds
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.001; // degrees
pub const DEFAULT_LOCATION_TIMEOUT: u64 = 10; // seconds
pub const DEFAULT_APPLY_TIMEOUT: u64 = 10; // seconds
pub const DEFAULT_NOTIFICATIONS: bool = false;

// Window used when no position is known at all
pub const DEFAULT_FALLBACK_SUNRISE: &str = "06:00:00";
pub const DEFAULT_FALLBACK_SUNSET: &str = "18:00:00";

// # External commands

pub const DEFAULT_LOCATION_URL: &str = "http://ip-api.com/json/";
pub const DEFAULT_DARK_COMMAND: &str =
    "gsettings set org.gnome.desktop.interface color-scheme 'prefer-dark'";
pub const DEFAULT_LIGHT_COMMAND: &str =
    "gsettings set org.gnome.desktop.interface color-scheme 'default'";
pub const NOTIFY_SEND_COMMAND: &str = "notify-send";

// # Validation limits

pub const MINIMUM_POLL_INTERVAL: u64 = 5;
pub const MAXIMUM_POLL_INTERVAL: u64 = 3600;

pub const MINIMUM_LOCATION_REFRESH_INTERVAL: u64 = 60;
pub const MAXIMUM_LOCATION_REFRESH_INTERVAL: u64 = 7 * 24 * 60 * 60;

pub const MINIMUM_CHANGE_THRESHOLD: f64 = 0.0;
pub const MAXIMUM_CHANGE_THRESHOLD: f64 = 1.0;

pub const MINIMUM_TIMEOUT: u64 = 1;
pub const MAXIMUM_TIMEOUT: u64 = 120;

// # Solar calculation

/// Zenith of the sun's upper limb at the horizon, refraction included.
pub const SUNRISE_ZENITH_DEGREES: f64 = 90.833;

// # File names

pub const CONFIG_FILE_NAME: &str = "themeshift.toml";
pub const LOCATION_FILE_NAME: &str = "location.json";
pub const STATUS_FILE_NAME: &str = "status.json";
pub const LOCK_FILE_NAME: &str = "themeshift.lock";

// # Process

pub const EXIT_FAILURE: i32 = 1;

// How often a child command is polled for completion
pub const COMMAND_POLL_INTERVAL_MS: u64 = 25;

#[cfg(test)]
pub mod test_constants {
    // Berlin
    pub const TEST_LATITUDE: f64 = 52.52;
    pub const TEST_LONGITUDE: f64 = 13.405;
    pub const TEST_LABEL: &str = "Berlin, Germany";

    pub const TEST_FALLBACK_SUNRISE: &str = "07:00:00";
    pub const TEST_FALLBACK_SUNSET: &str = "19:30:00";
}
