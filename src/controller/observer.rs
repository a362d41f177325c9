//! Status snapshots and the observers that receive them.
//!
//! The controller publishes an immutable [`StatusSnapshot`] after every tick
//! and every lifecycle change. Observers run on the controller thread;
//! other threads read the latest snapshot through a [`StatusHandle`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::common::utils::{format_duration, private_path, write_atomically};
use crate::geo::{GeoPosition, PositionOrigin, SolarOutcome};
use crate::theme::DisplayState;

/// Controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Initializing,
    Running,
    Paused,
    Stopped,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Initializing => write!(f, "initializing"),
            Lifecycle::Running => write!(f, "running"),
            Lifecycle::Paused => write!(f, "paused"),
            Lifecycle::Stopped => write!(f, "stopped"),
        }
    }
}

/// Everything an outside reader needs to describe the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub lifecycle: Lifecycle,
    /// State the schedule asks for right now.
    pub display_state: Option<DisplayState>,
    /// State last applied successfully.
    pub applied_state: Option<DisplayState>,
    pub outcome: Option<SolarOutcome>,
    pub next_switch: Option<DateTime<Utc>>,
    pub position: Option<GeoPosition>,
    pub position_origin: PositionOrigin,
    pub updated_at: DateTime<Utc>,
}

/// Receives every published snapshot.
pub trait StatusObserver: Send {
    fn on_status(&mut self, snapshot: &StatusSnapshot);
}

/// Shared read access to the latest snapshot.
#[derive(Clone, Default)]
pub struct StatusHandle(Arc<RwLock<Option<StatusSnapshot>>>);

impl StatusHandle {
    pub fn latest(&self) -> Option<StatusSnapshot> {
        match self.0.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn publish(&self, snapshot: StatusSnapshot) {
        match self.0.write() {
            Ok(mut guard) => *guard = Some(snapshot),
            Err(poisoned) => *poisoned.into_inner() = Some(snapshot),
        }
    }
}

/// Writes each snapshot to `status.json` for the `status` command.
pub struct StatusFileObserver {
    path: PathBuf,
    failed: bool,
}

impl StatusFileObserver {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            failed: false,
        }
    }

    /// Remove the status file so stale state is never reported.
    pub fn remove(&self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

impl StatusObserver for StatusFileObserver {
    fn on_status(&mut self, snapshot: &StatusSnapshot) {
        let result = serde_json::to_vec_pretty(snapshot)
            .map_err(anyhow::Error::from)
            .and_then(|json| write_atomically(&self.path, &json));

        match result {
            Ok(()) => self.failed = false,
            Err(e) if !self.failed => {
                log_warning!("Failed to write status file: {e}");
                self.failed = true;
            }
            Err(_) => {}
        }
    }
}

/// Read a snapshot written by [`StatusFileObserver`].
pub fn read_status_file(path: &Path) -> Result<Option<StatusSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", private_path(path)))?;
    let snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Corrupt status file {}", private_path(path)))?;
    Ok(Some(snapshot))
}

/// Logs a countdown to the next switch whenever the display state changes.
#[derive(Default)]
pub struct LogObserver {
    last_state: Option<DisplayState>,
    last_lifecycle: Option<Lifecycle>,
}

impl StatusObserver for LogObserver {
    fn on_status(&mut self, snapshot: &StatusSnapshot) {
        let lifecycle_changed = self.last_lifecycle != Some(snapshot.lifecycle);
        let state_changed = self.last_state != snapshot.display_state;
        self.last_lifecycle = Some(snapshot.lifecycle);
        self.last_state = snapshot.display_state;

        if !(lifecycle_changed || state_changed) || snapshot.lifecycle != Lifecycle::Running {
            return;
        }

        let Some(state) = snapshot.display_state else {
            return;
        };

        match snapshot.next_switch {
            Some(next) => {
                let remaining = (next - snapshot.updated_at).num_seconds().max(0) as u64;
                log_block_start!(
                    "{}{} theme, switching in {}",
                    state.symbol(),
                    capitalize(&state.to_string()),
                    format_duration(remaining)
                );
            }
            None => log_block_start!(
                "{}{} theme, no switch today",
                state.symbol(),
                capitalize(&state.to_string())
            ),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            lifecycle: Lifecycle::Running,
            display_state: Some(DisplayState::Dark),
            applied_state: Some(DisplayState::Dark),
            outcome: None,
            next_switch: None,
            position: None,
            position_origin: PositionOrigin::Default,
            updated_at: DateTime::parse_from_rfc3339("2024-06-01T22:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_status_handle_publishes_latest() {
        let handle = StatusHandle::default();
        assert_eq!(handle.latest(), None);

        let reader = handle.clone();
        handle.publish(snapshot());
        assert_eq!(reader.latest(), Some(snapshot()));
    }

    #[test]
    fn test_status_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("status.json");
        let mut observer = StatusFileObserver::new(path.clone());

        assert_eq!(read_status_file(&path).unwrap(), None);
        observer.on_status(&snapshot());
        assert_eq!(read_status_file(&path).unwrap(), Some(snapshot()));

        observer.remove();
        assert!(!path.exists());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("dark"), "Dark");
        assert_eq!(capitalize(""), "");
    }
}
