use super::loading::apply_defaults;
use super::validation::validate_config;
use super::*;
use crate::common::constants::test_constants::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn create_test_config() -> Config {
    Config {
        enabled: Some(true),
        poll_interval: Some(DEFAULT_POLL_INTERVAL),
        location_refresh_interval: Some(DEFAULT_LOCATION_REFRESH_INTERVAL),
        change_threshold: Some(DEFAULT_CHANGE_THRESHOLD),
        location_timeout: Some(DEFAULT_LOCATION_TIMEOUT),
        apply_timeout: Some(DEFAULT_APPLY_TIMEOUT),
        fallback_sunrise: Some(TEST_FALLBACK_SUNRISE.to_string()),
        fallback_sunset: Some(TEST_FALLBACK_SUNSET.to_string()),
        latitude: None,
        longitude: None,
        location_label: None,
        location_url: None,
        location_command: None,
        dark_command: None,
        light_command: None,
        notifications: None,
    }
}

#[test]
#[serial]
fn test_config_load_default_creation() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("themeshift").join(CONFIG_FILE_NAME);

    // Save and restore XDG_CONFIG_HOME
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    // First load should create default config
    let result = Config::load();

    // Restore original
    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    if let Err(e) = &result {
        eprintln!("Config::load() failed: {:?}", e);
    }
    let config = result.unwrap();
    assert!(config_path.exists());

    // The generated file round-trips to the defaults
    assert!(config.enabled());
    assert_eq!(config.poll_interval().as_secs(), DEFAULT_POLL_INTERVAL);
    assert_eq!(config.manual_coordinates(), None);
    assert_eq!(config.dark_command(), DEFAULT_DARK_COMMAND);
    assert_eq!(config.location_url(), DEFAULT_LOCATION_URL);
    assert_eq!(config.location_command(), None);
}

#[test]
fn test_config_validation_basic() {
    assert!(validate_config(&create_test_config()).is_ok());
    assert!(validate_config(&Config::default()).is_ok());
}

#[test]
fn test_config_validation_interval_ranges() {
    let mut config = create_test_config();
    config.poll_interval = Some(MINIMUM_POLL_INTERVAL);
    assert!(validate_config(&config).is_ok());
    config.poll_interval = Some(MAXIMUM_POLL_INTERVAL);
    assert!(validate_config(&config).is_ok());
    config.poll_interval = Some(MINIMUM_POLL_INTERVAL - 1);
    let err = validate_config(&config).unwrap_err().to_string();
    assert!(err.contains("poll_interval"), "unexpected error: {err}");

    let mut config = create_test_config();
    config.location_refresh_interval = Some(MAXIMUM_LOCATION_REFRESH_INTERVAL + 1);
    assert!(validate_config(&config).is_err());

    let mut config = create_test_config();
    config.location_timeout = Some(0);
    assert!(validate_config(&config).is_err());

    let mut config = create_test_config();
    config.apply_timeout = Some(MAXIMUM_TIMEOUT + 1);
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_config_validation_change_threshold() {
    let mut config = create_test_config();
    config.change_threshold = Some(0.0);
    assert!(validate_config(&config).is_ok());
    config.change_threshold = Some(1.0);
    assert!(validate_config(&config).is_ok());
    config.change_threshold = Some(-0.1);
    assert!(validate_config(&config).is_err());
    config.change_threshold = Some(f64::NAN);
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_config_validation_fallback_schedule() {
    let mut config = create_test_config();
    config.fallback_sunrise = Some("7:00".to_string());
    let err = validate_config(&config).unwrap_err().to_string();
    assert!(err.contains("fallback_sunrise"), "unexpected error: {err}");

    let mut config = create_test_config();
    config.fallback_sunrise = Some("20:00:00".to_string());
    config.fallback_sunset = Some("08:00:00".to_string());
    let err = validate_config(&config).unwrap_err().to_string();
    assert!(err.contains("earlier"), "unexpected error: {err}");
}

#[test]
fn test_config_validation_coordinates() {
    let mut config = create_test_config();
    config.latitude = Some(TEST_LATITUDE);
    config.longitude = Some(TEST_LONGITUDE);
    assert!(validate_config(&config).is_ok());

    config.latitude = Some(90.5);
    assert!(validate_config(&config).is_err());

    config.latitude = Some(TEST_LATITUDE);
    config.longitude = Some(-180.5);
    assert!(validate_config(&config).is_err());

    // Both halves or neither
    config.longitude = None;
    let err = validate_config(&config).unwrap_err().to_string();
    assert!(err.contains("longitude is missing"), "unexpected error: {err}");
}

#[test]
fn test_config_validation_empty_commands() {
    let mut config = create_test_config();
    config.dark_command = Some("   ".to_string());
    let err = validate_config(&config).unwrap_err().to_string();
    assert!(err.contains("dark_command"), "unexpected error: {err}");
}

#[test]
fn test_apply_defaults_fills_missing_fields() {
    let mut config = Config::default();
    apply_defaults(&mut config);

    assert_eq!(config.enabled, Some(DEFAULT_ENABLED));
    assert_eq!(config.change_threshold, Some(DEFAULT_CHANGE_THRESHOLD));
    assert_eq!(
        config.fallback_sunrise.as_deref(),
        Some(DEFAULT_FALLBACK_SUNRISE)
    );
    assert_eq!(config.light_command.as_deref(), Some(DEFAULT_LIGHT_COMMAND));
    assert_eq!(config.latitude, None);
    assert_eq!(config.location_label, None);
    assert_eq!(config.location_url.as_deref(), Some(DEFAULT_LOCATION_URL));
    assert_eq!(config.location_command, None);
}

#[test]
fn test_load_from_path_parses_partial_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(CONFIG_FILE_NAME);
    fs::write(
        &path,
        r#"
enabled = false
poll_interval = 30
latitude = 52.52
longitude = 13.405
location_label = "Berlin, Germany"
dark_command = "echo dark"
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert!(!config.enabled());
    assert_eq!(config.poll_interval().as_secs(), 30);
    assert_eq!(
        config.manual_coordinates(),
        Some((TEST_LATITUDE, TEST_LONGITUDE))
    );
    assert_eq!(config.location_label.as_deref(), Some(TEST_LABEL));
    assert_eq!(config.dark_command(), "echo dark");
    assert_eq!(config.light_command(), DEFAULT_LIGHT_COMMAND);

    let (sunrise, sunset) = config.fallback_times().unwrap();
    assert_eq!(sunrise.format("%H:%M:%S").to_string(), DEFAULT_FALLBACK_SUNRISE);
    assert_eq!(sunset.format("%H:%M:%S").to_string(), DEFAULT_FALLBACK_SUNSET);
}

#[test]
fn test_load_from_path_rejects_invalid_values() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "poll_interval = 1\n").unwrap();
    assert!(load_from_path(&path).is_err());

    fs::write(&path, "poll_interval = \"soon\"\n").unwrap();
    assert!(load_from_path(&path).is_err());

    assert!(load_from_path(&temp_dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_default_config_comments_are_aligned() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join(CONFIG_FILE_NAME);
    create_default_config(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("#[Automation]"));
    assert!(content.contains("#latitude = 52.520000"));

    let enabled = content.lines().find(|l| l.starts_with("enabled")).unwrap();
    let poll = content
        .lines()
        .find(|l| l.starts_with("poll_interval"))
        .unwrap();
    assert_eq!(enabled.find('#'), poll.find('#'));
}
