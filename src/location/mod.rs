//! Where the observer is, and where that answer is remembered.
//!
//! ## Module Structure
//!
//! - [`provider`]: Sources of fresh positions (ip-api lookup, a shell command or fixed coordinates)
//! - [`store`]: Durable record of the last accepted position
//!
//! The controller owns the caching policy: providers and stores only fetch
//! and persist.

use anyhow::Result;
use std::time::Duration;

use crate::geo::GeoPosition;

pub mod provider;
pub mod store;

pub use provider::{CommandLocationProvider, IpApiLocationProvider, ManualLocationProvider};
pub use store::FileLocationStore;

/// Yields the observer's current position.
///
/// Fetches may block for up to `timeout` and may fail; the controller calls
/// them from a worker thread.
#[cfg_attr(test, mockall::automock)]
pub trait LocationProvider: Send + Sync {
    fn fetch(&self, timeout: Duration) -> Result<GeoPosition>;

    /// Short name for log output.
    fn name(&self) -> &'static str;
}

/// Persists the last accepted position across restarts.
#[cfg_attr(test, mockall::automock)]
pub trait LocationStore: Send + Sync {
    /// The saved position, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<GeoPosition>>;

    fn save(&self, position: &GeoPosition) -> Result<()>;
}
