//! Location providers.
//!
//! The default provider asks an IP geolocation service (ip-api.com) over
//! HTTP and parses its JSON reply. A shell command printing the same JSON
//! can replace the lookup, and users who prefer not to send requests can pin
//! coordinates in the config instead, which selects
//! [`ManualLocationProvider`].

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::LocationProvider;
use crate::common::utils::format_coordinates;
use crate::config::Config;
use crate::geo::GeoPosition;
use crate::io::command::run_shell;
use crate::time::source::TimeSource;

/// Reply format of `http://ip-api.com/json/`.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    country: Option<String>,
}

/// Queries an ip-api compatible endpoint.
pub struct IpApiLocationProvider {
    url: String,
    clock: Arc<dyn TimeSource>,
}

impl IpApiLocationProvider {
    pub fn new(url: String, clock: Arc<dyn TimeSource>) -> Self {
        Self { url, clock }
    }
}

impl LocationProvider for IpApiLocationProvider {
    fn fetch(&self, timeout: Duration) -> Result<GeoPosition> {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .new_agent();

        let response: IpApiResponse = agent
            .get(&self.url)
            .call()
            .with_context(|| format!("Location request to {} failed", self.url))?
            .body_mut()
            .read_json()
            .context("Location service returned invalid JSON")?;

        into_position(response, self.clock.now())
    }

    fn name(&self) -> &'static str {
        "ip-api"
    }
}

/// Runs a shell command that prints ip-api style JSON.
pub struct CommandLocationProvider {
    command: String,
    clock: Arc<dyn TimeSource>,
}

impl CommandLocationProvider {
    pub fn new(command: String, clock: Arc<dyn TimeSource>) -> Self {
        Self { command, clock }
    }
}

impl LocationProvider for CommandLocationProvider {
    fn fetch(&self, timeout: Duration) -> Result<GeoPosition> {
        let output = run_shell(&self.command, timeout)?;
        if !output.status.success() {
            bail!("Location command failed: {}", output.failure_reason());
        }
        parse_response(&output.stdout, self.clock.now())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Parse an ip-api reply into a position observed at `observed_at`.
pub(crate) fn parse_response(body: &str, observed_at: DateTime<Utc>) -> Result<GeoPosition> {
    let response: IpApiResponse =
        serde_json::from_str(body.trim()).context("Location service returned invalid JSON")?;
    into_position(response, observed_at)
}

fn into_position(response: IpApiResponse, observed_at: DateTime<Utc>) -> Result<GeoPosition> {
    if response.status != "success" {
        bail!(
            "Location service reported {}: {}",
            response.status,
            response.message.as_deref().unwrap_or("no reason given")
        );
    }

    let (Some(latitude), Some(longitude)) = (response.lat, response.lon) else {
        bail!("Location service reply is missing coordinates");
    };

    let label = match (response.city.as_deref(), response.country.as_deref()) {
        (Some(city), Some(country)) if !city.is_empty() && !country.is_empty() => {
            format!("{city}, {country}")
        }
        (Some(city), _) if !city.is_empty() => city.to_string(),
        (_, Some(country)) => country.to_string(),
        _ => String::new(),
    };

    Ok(GeoPosition::new(latitude, longitude, label, observed_at)?)
}

/// Always reports the coordinates pinned in the config.
pub struct ManualLocationProvider {
    latitude: f64,
    longitude: f64,
    label: String,
    clock: Arc<dyn TimeSource>,
}

impl ManualLocationProvider {
    pub fn new(
        latitude: f64,
        longitude: f64,
        label: Option<String>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            label: label.unwrap_or_else(|| format_coordinates(latitude, longitude)),
            clock,
        }
    }
}

impl LocationProvider for ManualLocationProvider {
    fn fetch(&self, _timeout: Duration) -> Result<GeoPosition> {
        Ok(GeoPosition::new(
            self.latitude,
            self.longitude,
            self.label.clone(),
            self.clock.now(),
        )?)
    }

    fn name(&self) -> &'static str {
        "config"
    }
}

/// Pick the provider the config asks for.
pub fn from_config(config: &Config, clock: Arc<dyn TimeSource>) -> Arc<dyn LocationProvider> {
    match config.manual_coordinates() {
        Some((latitude, longitude)) => Arc::new(ManualLocationProvider::new(
            latitude,
            longitude,
            config.location_label.clone(),
            clock,
        )),
        None => match config.location_command() {
            Some(command) => Arc::new(CommandLocationProvider::new(command.to_string(), clock)),
            None => Arc::new(IpApiLocationProvider::new(config.location_url(), clock)),
        },
    }
}
