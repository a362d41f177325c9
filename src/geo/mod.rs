//! Solar geometry and observer position.
//!
//! ## Module Structure
//!
//! - [`solar`]: NOAA sunrise/sunset calculation for a single calendar date
//! - [`position`]: Observed coordinates and the change threshold used for caching
//! - [`window`]: Display-state decisions derived from a solar outcome
//!
//! Everything here is pure. The controller decides when to call it and what
//! to do with the result.

pub mod position;
pub mod solar;
pub mod window;

pub use position::{GeoPosition, PositionOrigin};
pub use solar::{Polar, SolarOutcome, SolarWindow, compute};
pub use window::{fallback_window, next_switch, wanted_state};

#[cfg(test)]
mod tests;

/// Coordinate validation failures.
///
/// Callers working with `anyhow` can recover the variant through
/// `anyhow::Error::downcast_ref::<GeoError>()`.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("latitude {0} is outside the range -90 to 90")]
    InvalidLatitude(f64),
    #[error("longitude {0} is outside the range -180 to 180")]
    InvalidLongitude(f64),
}

/// Reject coordinates outside the geographic ranges (NaN included).
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), GeoError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GeoError::InvalidLatitude(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(GeoError::InvalidLongitude(longitude));
    }
    Ok(())
}
