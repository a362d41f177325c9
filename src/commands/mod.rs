//! Command-line command handlers for themeshift.
//!
//! Each one-shot CLI command lives in its own submodule. Commands that talk
//! to the daemon find it through the lock file (`io::instance`) and read its
//! published status from the state directory.

pub mod help;
pub mod status;
pub mod stop;
pub mod times;
pub mod toggle;
