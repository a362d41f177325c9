//! Display states and the abstraction that puts the desktop into one.
//!
//! The controller only ever asks for "dark" or "light". How that happens
//! (a gsettings call, a config file rewrite, a portal request) is up to the
//! `ThemeApplier` implementation it was built with.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod applier;

pub use applier::CommandThemeApplier;

/// Visual state of the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    Dark,
    Light,
}

impl DisplayState {
    pub fn symbol(self) -> &'static str {
        match self {
            DisplayState::Dark => "󰖔 ",
            DisplayState::Light => "󰖨 ",
        }
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayState::Dark => write!(f, "dark"),
            DisplayState::Light => write!(f, "light"),
        }
    }
}

/// Puts the desktop into a display state.
///
/// Implementations must be idempotent: applying the state that is already
/// active is harmless. Calls may block; the controller runs them on a worker
/// thread and never issues two at once.
#[cfg_attr(test, mockall::automock)]
pub trait ThemeApplier: Send + Sync {
    /// Apply `state`, returning once the change has been made or has failed.
    fn apply(&self, state: DisplayState) -> Result<()>;

    /// Short name for log output.
    fn name(&self) -> &'static str;
}
