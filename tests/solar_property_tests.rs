use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use themeshift::geo::{SolarOutcome, compute, next_switch, wanted_state};
use themeshift::theme::DisplayState;

/// Generate latitudes outside the polar circles
fn temperate_latitude_strategy() -> impl Strategy<Value = f64> {
    -66.0..=66.0
}

/// Generate valid longitude values
fn longitude_strategy() -> impl Strategy<Value = f64> {
    -180.0..=180.0
}

/// Generate dates across two centuries
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=365).prop_map(|(year, ordinal)| {
        NaiveDate::from_yo_opt(year, ordinal).expect("ordinal within every year")
    })
}

proptest! {
    /// Sunrise precedes sunset on the same solar day. Only the band just
    /// inside ±66° may see the sun skim the horizon all day.
    #[test]
    fn test_window_is_ordered(
        lat in temperate_latitude_strategy(),
        lon in longitude_strategy(),
        date in date_strategy()
    ) {
        match compute(date, lat, lon).unwrap() {
            SolarOutcome::Window(window) => {
                prop_assert!(window.sunrise < window.sunset);
                prop_assert!(window.sunset - window.sunrise < Duration::hours(24));

                let midnight = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
                prop_assert!(window.sunrise > midnight - Duration::hours(24));
                prop_assert!(window.sunset < midnight + Duration::hours(48));
            }
            SolarOutcome::NoTransition { .. } => {
                prop_assert!(lat.abs() > 65.0, "no transition at latitude {lat}");
            }
        }
    }

    /// The same inputs always give the same answer
    #[test]
    fn test_compute_is_deterministic(
        lat in -90.0..=90.0f64,
        lon in longitude_strategy(),
        date in date_strategy()
    ) {
        prop_assert_eq!(compute(date, lat, lon), compute(date, lat, lon));
    }

    /// Midday is light and the instant before sunrise is dark
    #[test]
    fn test_wanted_state_inside_and_outside_window(
        lat in -60.0..=60.0f64,
        lon in longitude_strategy(),
        date in date_strategy()
    ) {
        let outcome = compute(date, lat, lon).unwrap();
        let window = *outcome.window().expect("window below 60 degrees");
        let midday = window.sunrise + (window.sunset - window.sunrise) / 2;

        prop_assert_eq!(wanted_state(midday, &outcome), DisplayState::Light);
        prop_assert_eq!(
            wanted_state(window.sunrise - Duration::seconds(1), &outcome),
            DisplayState::Dark
        );
        prop_assert_eq!(next_switch(midday, &outcome), Some(window.sunset));
    }

    /// Out-of-range coordinates are rejected, never computed
    #[test]
    fn test_invalid_latitude_rejected(
        lat in prop_oneof![-1000.0..-90.001f64, 90.001..1000.0f64],
        lon in longitude_strategy()
    ) {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        prop_assert!(compute(date, lat, lon).is_err());
    }
}
