//! Configuration validation functionality.
//!
//! Rejects out-of-range values before the configuration reaches the
//! controller. Messages name the field and the accepted range.

use anyhow::Result;

use super::{Config, parse_time};
use crate::common::constants::*;

/// Validate every field that is present.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_seconds(
        "poll_interval",
        config.poll_interval,
        MINIMUM_POLL_INTERVAL,
        MAXIMUM_POLL_INTERVAL,
    )?;
    validate_seconds(
        "location_refresh_interval",
        config.location_refresh_interval,
        MINIMUM_LOCATION_REFRESH_INTERVAL,
        MAXIMUM_LOCATION_REFRESH_INTERVAL,
    )?;
    validate_seconds(
        "location_timeout",
        config.location_timeout,
        MINIMUM_TIMEOUT,
        MAXIMUM_TIMEOUT,
    )?;
    validate_seconds("apply_timeout", config.apply_timeout, MINIMUM_TIMEOUT, MAXIMUM_TIMEOUT)?;

    if let Some(threshold) = config.change_threshold
        && !(MINIMUM_CHANGE_THRESHOLD..=MAXIMUM_CHANGE_THRESHOLD).contains(&threshold)
    {
        anyhow::bail!(
            "change_threshold ({}) must be between {} and {} degrees",
            threshold,
            MINIMUM_CHANGE_THRESHOLD,
            MAXIMUM_CHANGE_THRESHOLD
        );
    }

    validate_fallback_schedule(config)?;
    validate_coordinates(config)?;

    for (field, value) in [
        ("location_url", &config.location_url),
        ("location_command", &config.location_command),
        ("dark_command", &config.dark_command),
        ("light_command", &config.light_command),
    ] {
        if let Some(command) = value
            && command.trim().is_empty()
        {
            anyhow::bail!("{field} cannot be empty");
        }
    }

    Ok(())
}

fn validate_seconds(field: &str, value: Option<u64>, min: u64, max: u64) -> Result<()> {
    if let Some(seconds) = value
        && !(min..=max).contains(&seconds)
    {
        anyhow::bail!(
            "{} ({} seconds) must be between {} and {} seconds",
            field,
            seconds,
            min,
            max
        );
    }
    Ok(())
}

fn validate_fallback_schedule(config: &Config) -> Result<()> {
    let sunrise = parse_time(
        config
            .fallback_sunrise
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_SUNRISE),
    )
    .map_err(|e| anyhow::anyhow!("fallback_sunrise: {e}"))?;
    let sunset = parse_time(
        config
            .fallback_sunset
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_SUNSET),
    )
    .map_err(|e| anyhow::anyhow!("fallback_sunset: {e}"))?;

    if sunrise >= sunset {
        anyhow::bail!(
            "fallback_sunrise ({}) must be earlier than fallback_sunset ({})",
            sunrise.format("%H:%M:%S"),
            sunset.format("%H:%M:%S")
        );
    }
    Ok(())
}

fn validate_coordinates(config: &Config) -> Result<()> {
    match (config.latitude, config.longitude) {
        (Some(_), None) => anyhow::bail!("latitude is set but longitude is missing"),
        (None, Some(_)) => anyhow::bail!("longitude is set but latitude is missing"),
        _ => {}
    }

    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    Ok(())
}
