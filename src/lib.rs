//! # themeshift
//!
//! Internal library for the themeshift binary.
//!
//! This library exists to enable testing of the automation internals and to
//! keep CLI dispatch (main.rs) separate from application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `ThemeShift` wires configuration, locking, signals and
//!   the controller together
//! - **Controller**: `controller` owns the schedule, the cached position and
//!   the last applied theme, and drives the tick loop
//! - **Solar**: `geo` computes sunrise/sunset (NOAA) and decides dark or light
//! - **Collaborators**: `location` (provider and store), `theme` (applier),
//!   `notify` (notification sinks)
//! - **Configuration**: `config` for TOML-based settings
//! - **Commands**: `commands` for CLI subcommands (status, toggle, stop, times)
//! - **Infrastructure**: lock file, signal handling, D-Bus monitoring, state
//!   directories, time source and logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod controller;
pub mod geo;
pub mod io;
pub mod location;
pub mod notify;
pub mod state;
pub mod theme;
pub mod time;

// Internal modules
mod themeshift;

// Re-export for binary
pub use themeshift::ThemeShift;
