//! Sunrise and sunset from the NOAA simplified solar position equations.
//!
//! The fractional year is evaluated at local solar noon, which is accurate to
//! a couple of minutes for inhabited latitudes. Sunrise and sunset use the
//! standard 90.833° zenith (0.833° for refraction and the solar disc radius).
//!
//! When the hour-angle cosine leaves [-1, 1] the sun never crosses the horizon
//! on that date and the result is [`SolarOutcome::NoTransition`] instead of an
//! instant.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use super::{GeoError, validate_coordinates};
use crate::common::constants::SUNRISE_ZENITH_DEGREES;

/// Sunrise and sunset instants for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarWindow {
    pub date: NaiveDate,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// Which way the sun stays when it does not cross the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polar {
    /// Sun above the horizon all day.
    Day,
    /// Sun below the horizon all day.
    Night,
}

impl fmt::Display for Polar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polar::Day => write!(f, "polar day"),
            Polar::Night => write!(f, "polar night"),
        }
    }
}

/// Result of a solar computation for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolarOutcome {
    Window(SolarWindow),
    NoTransition { date: NaiveDate, polar: Polar },
}

impl SolarOutcome {
    pub fn date(&self) -> NaiveDate {
        match self {
            SolarOutcome::Window(window) => window.date,
            SolarOutcome::NoTransition { date, .. } => *date,
        }
    }

    pub fn window(&self) -> Option<&SolarWindow> {
        match self {
            SolarOutcome::Window(window) => Some(window),
            SolarOutcome::NoTransition { .. } => None,
        }
    }
}

/// Compute sunrise and sunset for `date` at the given coordinates.
///
/// Instants are UTC, truncated to whole seconds, and may fall on the
/// neighbouring UTC day for longitudes far from Greenwich.
pub fn compute(date: NaiveDate, latitude: f64, longitude: f64) -> Result<SolarOutcome, GeoError> {
    validate_coordinates(latitude, longitude)?;

    let hour_utc = 12.0 - longitude / 15.0;
    let day_of_year = date.ordinal() as f64;
    let gamma = 2.0 * PI / 365.0 * (day_of_year - 1.0 + (hour_utc - 12.0) / 24.0);

    let eqtime = equation_of_time(gamma);
    let decl = declination(gamma);

    let lat = latitude.to_radians();
    let zenith = SUNRISE_ZENITH_DEGREES.to_radians();
    let cos_h = (zenith.cos() - lat.sin() * decl.sin()) / (lat.cos() * decl.cos());

    if cos_h.is_nan() {
        // Only reachable at an exact pole where cos(lat) vanishes
        let polar = if lat.sin() * decl.sin() > 0.0 {
            Polar::Day
        } else {
            Polar::Night
        };
        return Ok(SolarOutcome::NoTransition { date, polar });
    }
    if cos_h < -1.0 {
        return Ok(SolarOutcome::NoTransition {
            date,
            polar: Polar::Day,
        });
    }
    if cos_h > 1.0 {
        return Ok(SolarOutcome::NoTransition {
            date,
            polar: Polar::Night,
        });
    }

    let hour_angle = cos_h.acos().to_degrees();
    let sunrise_minutes = 720.0 - 4.0 * (longitude + hour_angle) - eqtime;
    let sunset_minutes = 720.0 - 4.0 * (longitude - hour_angle) - eqtime;

    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    let sunrise = midnight + whole_seconds(sunrise_minutes);
    let sunset = midnight + whole_seconds(sunset_minutes);

    if sunset <= sunrise {
        // Hour angle rounded away entirely; the sun only grazes the horizon
        return Ok(SolarOutcome::NoTransition {
            date,
            polar: Polar::Night,
        });
    }

    Ok(SolarOutcome::Window(SolarWindow {
        date,
        sunrise,
        sunset,
    }))
}

/// Equation of time in minutes.
fn equation_of_time(gamma: f64) -> f64 {
    229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin())
}

/// Solar declination in radians.
fn declination(gamma: f64) -> f64 {
    0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin()
}

fn whole_seconds(minutes: f64) -> Duration {
    Duration::seconds((minutes * 60.0).floor() as i64)
}
