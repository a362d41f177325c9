//! Implementation of the times command.
//!
//! Computes today's solar window and the theme it calls for right now,
//! without touching the running instance or applying anything.
//!
//! Coordinates come from `--lat`/`--lon`, then the config's `latitude` and
//! `longitude`, then the saved location. Without any of them the fallback
//! schedule is shown.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::common::utils::{format_coordinates, format_duration};
use crate::config::Config;
use crate::geo::{self, SolarOutcome};
use crate::location::{FileLocationStore, LocationStore};
use crate::theme::DisplayState;
use crate::time::source::{RealTimeSource, TimeSource};

/// Handle the times command.
pub fn handle_times_command(coordinates: Option<(f64, f64)>, debug_enabled: bool) -> Result<()> {
    log_version!();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log_error_exit!("Configuration failed");
            eprintln!("{e:?}");
            std::process::exit(crate::common::constants::EXIT_FAILURE);
        }
    };

    let clock = RealTimeSource;
    let today = clock.today();

    let source = match coordinates.or_else(|| config.manual_coordinates()) {
        Some((lat, lon)) => Some((lat, lon, format_coordinates(lat, lon))),
        None => saved_location(debug_enabled),
    };

    let outcome = match &source {
        Some((lat, lon, label)) => {
            log_block_start!("Location: {label}");
            match geo::compute(today, *lat, *lon) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log_error_exit!("{e}");
                    return Ok(());
                }
            }
        }
        None => {
            log_block_start!("No location known, showing the fallback schedule");
            let (sunrise, sunset) = config.fallback_times()?;
            geo::fallback_window(today, sunrise, sunset, &clock)
        }
    };

    log_block_start!("Solar times for {today}:");
    for line in describe_times(&outcome, clock.now(), &clock) {
        log_indented!("{line}");
    }
    log_end!();
    Ok(())
}

fn saved_location(debug_enabled: bool) -> Option<(f64, f64, String)> {
    let store = FileLocationStore::in_state_dir().ok()?;
    match store.load() {
        Ok(Some(position)) => Some((position.latitude, position.longitude, position.to_string())),
        Ok(None) => None,
        Err(e) => {
            if debug_enabled {
                log_pipe!();
                log_debug!("Ignoring saved location: {e}");
            }
            None
        }
    }
}

/// Lines describing `outcome` as seen at `now`.
pub(crate) fn describe_times(
    outcome: &SolarOutcome,
    now: DateTime<Utc>,
    clock: &dyn TimeSource,
) -> Vec<String> {
    let mut lines = Vec::new();

    match outcome {
        SolarOutcome::Window(window) => {
            let day_length = (window.sunset - window.sunrise).num_seconds().max(0) as u64;
            lines.push(format!(
                "Sunrise:    {}",
                clock.to_local(window.sunrise).format("%H:%M:%S")
            ));
            lines.push(format!(
                "Sunset:     {}",
                clock.to_local(window.sunset).format("%H:%M:%S")
            ));
            lines.push(format!("Daylight:   {}", format_duration(day_length)));
        }
        SolarOutcome::NoTransition { polar, .. } => {
            lines.push(format!("No sunrise or sunset ({polar})"));
        }
    }

    let state = geo::wanted_state(now, outcome);
    lines.push(format!("Theme now:  {} {}", state, state.symbol()));

    if let Some(next) = geo::next_switch(now, outcome) {
        let remaining = (next - now).num_seconds().max(0) as u64;
        let upcoming = match state {
            DisplayState::Dark => DisplayState::Light,
            DisplayState::Light => DisplayState::Dark,
        };
        lines.push(format!(
            "Switches:   {} at {} (in {})",
            upcoming,
            clock.to_local(next).format("%H:%M"),
            format_duration(remaining)
        ));
    }

    lines
}

/// Display detailed help for the times command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("times - Show today's sunrise and sunset");
    log_block_start!("Usage: themeshift times [--lat <degrees> --lon <degrees>]");
    log_block_start!("Options:");
    log_indented!("--lat <degrees>  Latitude, -90 to 90 (north positive)");
    log_indented!("--lon <degrees>  Longitude, -180 to 180 (east positive)");
    log_block_start!("Description:");
    log_indented!("Prints today's solar window and the theme it calls for now.");
    log_indented!("Nothing is applied and the running instance is not contacted.");
    log_block_start!("Examples:");
    log_indented!("# Use the configured or saved location");
    log_indented!("themeshift times");
    log_pipe!();
    log_indented!("# Check another place");
    log_indented!("themeshift times --lat 69.65 --lon 18.96");
    log_end!();
}
