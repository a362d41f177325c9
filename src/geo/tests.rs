use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

use super::*;
use crate::common::constants::test_constants::*;
use crate::theme::DisplayState;
use crate::time::source::ManualTimeSource;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn at(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
}

fn window_of(outcome: SolarOutcome) -> SolarWindow {
    match outcome {
        SolarOutcome::Window(window) => window,
        other => panic!("expected a window, got {other:?}"),
    }
}

fn assert_close(actual: DateTime<Utc>, expected: DateTime<Utc>, minutes: i64) {
    let diff = (actual - expected).num_seconds().abs();
    assert!(
        diff <= minutes * 60,
        "{actual} is {diff}s away from {expected} (allowed {minutes}m)"
    );
}

#[test]
fn test_coordinate_validation() {
    assert!(compute(date(2024, 6, 21), 40.7128, -74.0060).is_ok());
    assert!(compute(date(2024, 6, 21), 90.0, 180.0).is_ok());
    assert!(compute(date(2024, 6, 21), -90.0, -180.0).is_ok());

    assert_eq!(
        compute(date(2024, 6, 21), 91.0, 0.0),
        Err(GeoError::InvalidLatitude(91.0))
    );
    assert_eq!(
        compute(date(2024, 6, 21), 0.0, -181.0),
        Err(GeoError::InvalidLongitude(-181.0))
    );
    assert!(matches!(
        compute(date(2024, 6, 21), f64::NAN, 0.0),
        Err(GeoError::InvalidLatitude(_))
    ));
}

#[test]
fn test_berlin_midsummer_window() {
    let window = window_of(compute(date(2024, 6, 21), TEST_LATITUDE, TEST_LONGITUDE).unwrap());

    // 04:43 and 21:33 CEST
    assert_close(window.sunrise, at("2024-06-21T02:43:00Z"), 5);
    assert_close(window.sunset, at("2024-06-21T19:33:00Z"), 5);
    assert_eq!(window.date, date(2024, 6, 21));
}

#[test]
fn test_equator_equinox_is_about_twelve_hours() {
    let window = window_of(compute(date(2024, 3, 20), 0.0, 0.0).unwrap());

    assert_close(window.sunrise, at("2024-03-20T06:00:00Z"), 15);
    assert_close(window.sunset, at("2024-03-20T18:00:00Z"), 15);
    let day = window.sunset - window.sunrise;
    assert!(day > Duration::hours(12) && day < Duration::minutes(12 * 60 + 15));
}

#[test]
fn test_instants_are_whole_seconds() {
    let window = window_of(compute(date(2024, 11, 3), -33.87, 151.21).unwrap());
    assert_eq!(window.sunrise.timestamp_subsec_nanos(), 0);
    assert_eq!(window.sunset.timestamp_subsec_nanos(), 0);
}

#[test]
fn test_far_east_sunrise_falls_on_previous_utc_day() {
    // Sydney sunrise is in the evening of the previous UTC day
    let window = window_of(compute(date(2024, 1, 15), -33.87, 151.21).unwrap());
    assert_eq!(window.sunrise.date_naive(), date(2024, 1, 14));
    assert!(window.sunrise < window.sunset);
}

#[test]
fn test_polar_day_and_night() {
    assert_eq!(
        compute(date(2024, 6, 21), 67.0, 20.0).unwrap(),
        SolarOutcome::NoTransition {
            date: date(2024, 6, 21),
            polar: Polar::Day
        }
    );
    assert_eq!(
        compute(date(2024, 12, 21), 78.22, 15.65).unwrap(),
        SolarOutcome::NoTransition {
            date: date(2024, 12, 21),
            polar: Polar::Night
        }
    );
}

#[test]
fn test_exact_poles() {
    let north_june = compute(date(2024, 6, 21), 90.0, 0.0).unwrap();
    let south_june = compute(date(2024, 6, 21), -90.0, 0.0).unwrap();
    let north_december = compute(date(2024, 12, 21), 90.0, 0.0).unwrap();

    assert!(matches!(
        north_june,
        SolarOutcome::NoTransition {
            polar: Polar::Day,
            ..
        }
    ));
    assert!(matches!(
        south_june,
        SolarOutcome::NoTransition {
            polar: Polar::Night,
            ..
        }
    ));
    assert!(matches!(
        north_december,
        SolarOutcome::NoTransition {
            polar: Polar::Night,
            ..
        }
    ));
}

#[test]
fn test_compute_is_deterministic() {
    let first = compute(date(2024, 9, 1), 35.68, 139.69).unwrap();
    for _ in 0..10 {
        assert_eq!(compute(date(2024, 9, 1), 35.68, 139.69).unwrap(), first);
    }
}

#[test]
fn test_matches_sunrise_crate() {
    use sunrise::{Coordinates, SolarDay, SolarEvent};

    let places = [
        (TEST_LATITUDE, TEST_LONGITUDE),
        (40.7128, -74.0060),
        (-33.87, 151.21),
        (1.35, 103.82),
        (-54.8, -68.3),
    ];
    let dates = [date(2024, 1, 10), date(2024, 4, 2), date(2024, 7, 19), date(2024, 10, 30)];

    for (lat, lon) in places {
        for day in dates {
            let window = window_of(compute(day, lat, lon).unwrap());
            let solar_day = SolarDay::new(Coordinates::new(lat, lon).unwrap(), day);

            assert_close(window.sunrise, solar_day.event_time(SolarEvent::Sunrise), 5);
            assert_close(window.sunset, solar_day.event_time(SolarEvent::Sunset), 5);
        }
    }
}

#[test]
fn test_wanted_state_boundaries() {
    let window = window_of(compute(date(2024, 6, 21), TEST_LATITUDE, TEST_LONGITUDE).unwrap());
    let outcome = SolarOutcome::Window(window);

    assert_eq!(
        wanted_state(window.sunrise - Duration::seconds(1), &outcome),
        DisplayState::Dark
    );
    assert_eq!(wanted_state(window.sunrise, &outcome), DisplayState::Light);
    assert_eq!(
        wanted_state(window.sunset - Duration::seconds(1), &outcome),
        DisplayState::Light
    );
    assert_eq!(wanted_state(window.sunset, &outcome), DisplayState::Dark);
}

#[test]
fn test_wanted_state_polar() {
    let day = SolarOutcome::NoTransition {
        date: date(2024, 6, 21),
        polar: Polar::Day,
    };
    let night = SolarOutcome::NoTransition {
        date: date(2024, 12, 21),
        polar: Polar::Night,
    };

    assert_eq!(wanted_state(at("2024-06-21T23:59:00Z"), &day), DisplayState::Light);
    assert_eq!(wanted_state(at("2024-12-21T12:00:00Z"), &night), DisplayState::Dark);
    assert_eq!(next_switch(at("2024-06-21T12:00:00Z"), &day), None);
}

#[test]
fn test_next_switch() {
    let outcome = SolarOutcome::Window(SolarWindow {
        date: date(2024, 3, 20),
        sunrise: at("2024-03-20T06:00:00Z"),
        sunset: at("2024-03-20T18:00:00Z"),
    });

    assert_eq!(
        next_switch(at("2024-03-20T03:00:00Z"), &outcome),
        Some(at("2024-03-20T06:00:00Z"))
    );
    assert_eq!(
        next_switch(at("2024-03-20T06:00:00Z"), &outcome),
        Some(at("2024-03-20T18:00:00Z"))
    );
    assert_eq!(
        next_switch(at("2024-03-20T18:00:00Z"), &outcome),
        Some(at("2024-03-21T06:00:00Z"))
    );
}

#[test]
fn test_fallback_window_uses_local_offset() {
    let clock = ManualTimeSource::new(
        at("2024-03-20T12:00:00Z"),
        FixedOffset::east_opt(2 * 3600).unwrap(),
    );
    let sunrise = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
    let sunset = NaiveTime::from_hms_opt(18, 0, 0).unwrap();

    let window = window_of(fallback_window(date(2024, 3, 20), sunrise, sunset, &clock));
    assert_eq!(window.sunrise, at("2024-03-20T04:00:00Z"));
    assert_eq!(window.sunset, at("2024-03-20T16:00:00Z"));
}

#[test]
fn test_position_change_threshold() {
    let observed = at("2024-03-20T12:00:00Z");
    let base = GeoPosition::new(TEST_LATITUDE, TEST_LONGITUDE, TEST_LABEL, observed).unwrap();
    let nudged = GeoPosition::new(TEST_LATITUDE + 0.0001, TEST_LONGITUDE, TEST_LABEL, observed)
        .unwrap();
    let moved = GeoPosition::new(TEST_LATITUDE, TEST_LONGITUDE + 0.01, TEST_LABEL, observed)
        .unwrap();

    assert!(!nudged.differs_materially(&base, 0.001));
    assert!(moved.differs_materially(&base, 0.001));
    assert!(base.differs_materially(&base, 0.0));
}

#[test]
fn test_position_display_name() {
    let observed = at("2024-03-20T12:00:00Z");
    let labeled = GeoPosition::new(TEST_LATITUDE, TEST_LONGITUDE, TEST_LABEL, observed).unwrap();
    let unlabeled = GeoPosition::new(-33.87, 151.21, "", observed).unwrap();

    assert_eq!(labeled.display_name(), TEST_LABEL);
    assert_eq!(unlabeled.display_name(), "33.870°S, 151.210°E");
    assert_eq!(
        labeled.to_string(),
        "Berlin, Germany (52.520°N, 13.405°E)"
    );
    assert_eq!(
        GeoPosition::new(95.0, 0.0, "", observed),
        Err(GeoError::InvalidLatitude(95.0))
    );
}
