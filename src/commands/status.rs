//! Status command - display the running instance's latest snapshot.
//!
//! The daemon rewrites `status.json` in its state directory after every tick
//! and lifecycle change. This command reads that file, so it always reports
//! what the daemon last decided rather than recomputing anything.

use anyhow::Result;

use crate::common::utils::format_duration;
use crate::controller::{Lifecycle, StatusSnapshot, observer::read_status_file};
use crate::geo::SolarOutcome;
use crate::time::source::{RealTimeSource, TimeSource};

/// Handle the status command.
///
/// # Arguments
/// * `json` - Print the raw snapshot as JSON
pub fn handle_status_command(json: bool) -> Result<()> {
    if crate::io::instance::get_running_instance()?.is_none() {
        log_error_standalone!("No themeshift process is running");
        println!("  Start themeshift first or use 'themeshift --debug' to run");
        return Ok(());
    }

    let Some(snapshot) = read_status_file(&crate::state::status_path()?)? else {
        log_warning_standalone!("themeshift is starting, no status yet");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for line in format_status(&snapshot, &RealTimeSource) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Render a snapshot as aligned `label: value` lines in local time.
pub(crate) fn format_status(snapshot: &StatusSnapshot, clock: &dyn TimeSource) -> Vec<String> {
    let mut lines = Vec::new();

    let theme = match (snapshot.display_state, snapshot.applied_state) {
        (Some(wanted), Some(applied)) if wanted == applied => wanted.to_string(),
        (Some(wanted), Some(applied)) => format!("{applied} (switching to {wanted})"),
        (Some(wanted), None) => format!("{wanted} (not applied yet)"),
        (None, Some(applied)) => applied.to_string(),
        (None, None) => "unknown".to_string(),
    };
    lines.push(format!("      Theme: {theme}"));

    let automation = match snapshot.lifecycle {
        Lifecycle::Running => "running",
        Lifecycle::Paused => "paused",
        Lifecycle::Initializing => "starting",
        Lifecycle::Stopped => "stopped",
    };
    lines.push(format!(" Automation: {automation}"));

    match snapshot.outcome {
        Some(SolarOutcome::Window(window)) => {
            lines.push(format!(
                "    Sunrise: {}",
                clock.to_local(window.sunrise).format("%H:%M")
            ));
            lines.push(format!(
                "     Sunset: {}",
                clock.to_local(window.sunset).format("%H:%M")
            ));
        }
        Some(SolarOutcome::NoTransition { polar, .. }) => {
            lines.push(format!("        Sun: {polar}, no sunrise or sunset today"));
        }
        None => {}
    }

    if snapshot.lifecycle == Lifecycle::Running
        && let Some(next) = snapshot.next_switch
    {
        let remaining = (next - snapshot.updated_at).num_seconds().max(0) as u64;
        lines.push(format!(
            "Next switch: {} (in {})",
            clock.to_local(next).format("%H:%M"),
            format_duration(remaining)
        ));
    }

    let location = match &snapshot.position {
        Some(position) => format!("{position} [{}]", snapshot.position_origin),
        None => format!("none, {}", snapshot.position_origin),
    };
    lines.push(format!("   Location: {location}"));

    lines
}

/// Display detailed help for the status command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("status - Show the current theme and schedule");
    log_block_start!("Usage: themeshift status [--json]");
    log_block_start!("Options:");
    log_indented!("--json  Print the raw status snapshot as JSON");
    log_block_start!("Output:");
    log_indented!("Theme        Applied theme, and the wanted one while switching");
    log_indented!("Automation   running or paused");
    log_indented!("Sunrise      Today's sunrise in local time");
    log_indented!("Sunset       Today's sunset in local time");
    log_indented!("Next switch  When the theme changes next");
    log_indented!("Location     Position in use and where it came from");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoPosition, Polar, PositionOrigin, SolarWindow};
    use crate::theme::DisplayState;
    use crate::time::source::ManualTimeSource;
    use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

    fn at(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    fn berlin_summer() -> StatusSnapshot {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        StatusSnapshot {
            lifecycle: Lifecycle::Running,
            display_state: Some(DisplayState::Light),
            applied_state: Some(DisplayState::Light),
            outcome: Some(SolarOutcome::Window(SolarWindow {
                date,
                sunrise: at("2024-06-21T02:43:00Z"),
                sunset: at("2024-06-21T19:33:00Z"),
            })),
            next_switch: Some(at("2024-06-21T19:33:00Z")),
            position: Some(
                GeoPosition::new(52.52, 13.405, "Berlin, Germany", at("2024-06-21T10:00:00Z"))
                    .unwrap(),
            ),
            position_origin: PositionOrigin::Provider,
            updated_at: at("2024-06-21T16:21:00Z"),
        }
    }

    fn cest() -> ManualTimeSource {
        ManualTimeSource::new(
            at("2024-06-21T16:21:00Z"),
            FixedOffset::east_opt(2 * 3600).unwrap(),
        )
    }

    #[test]
    fn test_format_status_window_in_local_time() {
        let lines = format_status(&berlin_summer(), &cest());
        assert_eq!(lines[0], "      Theme: light");
        assert_eq!(lines[1], " Automation: running");
        assert_eq!(lines[2], "    Sunrise: 04:43");
        assert_eq!(lines[3], "     Sunset: 21:33");
        assert_eq!(lines[4], "Next switch: 21:33 (in 3h12m)");
        assert!(lines[5].starts_with("   Location: Berlin, Germany"));
    }

    #[test]
    fn test_format_status_switch_in_progress() {
        let mut snapshot = berlin_summer();
        snapshot.applied_state = Some(DisplayState::Dark);
        let lines = format_status(&snapshot, &cest());
        assert_eq!(lines[0], "      Theme: dark (switching to light)");
    }

    #[test]
    fn test_format_status_paused_hides_next_switch() {
        let mut snapshot = berlin_summer();
        snapshot.lifecycle = Lifecycle::Paused;
        let lines = format_status(&snapshot, &cest());
        assert_eq!(lines[1], " Automation: paused");
        assert!(!lines.iter().any(|line| line.starts_with("Next switch")));
    }

    #[test]
    fn test_format_status_polar_day() {
        let mut snapshot = berlin_summer();
        snapshot.outcome = Some(SolarOutcome::NoTransition {
            date: NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(),
            polar: Polar::Day,
        });
        snapshot.next_switch = None;
        let lines = format_status(&snapshot, &cest());
        assert!(lines.contains(&"        Sun: polar day, no sunrise or sunset today".to_string()));
    }
}
