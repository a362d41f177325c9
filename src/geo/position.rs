//! Observed coordinates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{GeoError, validate_coordinates};
use crate::common::utils::format_coordinates;

/// A single observation of the user's position.
///
/// Positions are immutable; a newer observation replaces the old one
/// wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
    pub observed_at: DateTime<Utc>,
}

impl GeoPosition {
    /// Create a validated position.
    pub fn new(
        latitude: f64,
        longitude: f64,
        label: impl Into<String>,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, GeoError> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
            label: label.into(),
            observed_at,
        })
    }

    /// True when either axis moved by at least `threshold` degrees.
    ///
    /// A zero threshold treats every sample as a change.
    pub fn differs_materially(&self, other: &GeoPosition, threshold: f64) -> bool {
        (self.latitude - other.latitude).abs() >= threshold
            || (self.longitude - other.longitude).abs() >= threshold
    }

    /// Label, or formatted coordinates when the label is empty.
    pub fn display_name(&self) -> String {
        if self.label.trim().is_empty() {
            format_coordinates(self.latitude, self.longitude)
        } else {
            self.label.clone()
        }
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.display_name(),
            format_coordinates(self.latitude, self.longitude)
        )
    }
}

/// Where the position currently driving the schedule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionOrigin {
    /// Fresh sample from the location provider.
    Provider,
    /// Record loaded from the location store.
    Persisted,
    /// No position known; the fixed fallback window is in use.
    Default,
}

impl fmt::Display for PositionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionOrigin::Provider => write!(f, "provider"),
            PositionOrigin::Persisted => write!(f, "saved location"),
            PositionOrigin::Default => write!(f, "default schedule"),
        }
    }
}
