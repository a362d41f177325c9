//! Display-state decisions for a point in time.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use super::solar::{Polar, SolarOutcome, SolarWindow};
use crate::theme::DisplayState;
use crate::time::source::TimeSource;

/// State the display should be in at `now`.
///
/// The day is the half-open interval `[sunrise, sunset)`; the boundaries
/// themselves belong to the state that starts there.
pub fn wanted_state(now: DateTime<Utc>, outcome: &SolarOutcome) -> DisplayState {
    match outcome {
        SolarOutcome::Window(window) => {
            if now < window.sunrise || now >= window.sunset {
                DisplayState::Dark
            } else {
                DisplayState::Light
            }
        }
        SolarOutcome::NoTransition {
            polar: Polar::Day, ..
        } => DisplayState::Light,
        SolarOutcome::NoTransition {
            polar: Polar::Night,
            ..
        } => DisplayState::Dark,
    }
}

/// Next instant at which the wanted state flips.
///
/// After sunset, tomorrow's sunrise is approximated as today's plus 24 hours.
/// Polar outcomes have no switch on the current date.
pub fn next_switch(now: DateTime<Utc>, outcome: &SolarOutcome) -> Option<DateTime<Utc>> {
    let window = outcome.window()?;
    if now < window.sunrise {
        Some(window.sunrise)
    } else if now < window.sunset {
        Some(window.sunset)
    } else {
        Some(window.sunrise + Duration::hours(24))
    }
}

/// Fixed schedule used while no position is known.
///
/// `sunrise` and `sunset` are local wall-clock times on `date`. A time that
/// does not exist locally (DST gap) is resolved with the offset currently in
/// effect.
pub fn fallback_window(
    date: NaiveDate,
    sunrise: NaiveTime,
    sunset: NaiveTime,
    clock: &dyn TimeSource,
) -> SolarOutcome {
    let resolve = |time: NaiveTime| {
        let local = date.and_time(time);
        clock.local_to_utc(local).unwrap_or_else(|| {
            let offset = clock.offset_at(clock.now());
            (local - Duration::seconds(offset.local_minus_utc() as i64)).and_utc()
        })
    };

    SolarOutcome::Window(SolarWindow {
        date,
        sunrise: resolve(sunrise),
        sunset: resolve(sunset),
    })
}
