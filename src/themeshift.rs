//! Application coordinator that manages the complete lifecycle of themeshift.
//!
//! This module handles resource acquisition, wiring and orchestration of the
//! automation controller. It manages:
//! - Configuration loading
//! - Lock file management for single-instance enforcement
//! - Signal handler setup
//! - Sleep/resume and clock change monitoring
//! - Construction of the controller's collaborators
//!
//! The `ThemeShift` struct uses a builder pattern:
//! - Normal startup: `ThemeShift::new(debug_enabled).run()`
//! - Embedded or test runs: `ThemeShift::new(debug_enabled).without_lock().run()`

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::mpsc;

use crate::{
    common::constants::EXIT_FAILURE,
    config::Config,
    controller::{AutomationController, ControllerSettings, LogObserver, StatusFileObserver},
    io::{dbus, instance, signals::setup_signal_handler},
    location::{self, FileLocationStore},
    notify,
    theme::CommandThemeApplier,
    time::source::{RealTimeSource, TimeSource},
};

/// Builder for configuring and running the themeshift daemon.
///
/// # Examples
///
/// ```no_run
/// use themeshift::ThemeShift;
///
/// # fn main() -> anyhow::Result<()> {
/// ThemeShift::new(false).run()?;
/// # Ok(())
/// # }
/// ```
pub struct ThemeShift {
    debug_enabled: bool,
    create_lock: bool,
    show_headers: bool,
    monitor_system_events: bool,
}

impl ThemeShift {
    /// Create a new runner with defaults matching normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            create_lock: true,
            show_headers: true,
            monitor_system_events: true,
        }
    }

    /// Skip lock file creation
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    /// Skip header display
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Don't watch D-Bus or the system clock
    pub fn without_system_events(mut self) -> Self {
        self.monitor_system_events = false;
        self
    }

    /// Execute the daemon until a shutdown signal arrives.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
            if self.debug_enabled {
                log_pipe!();
                log_debug!("Debug mode enabled");
            }
        }

        let config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                log_error_exit!("Configuration failed");
                eprintln!("{e:?}");
                std::process::exit(EXIT_FAILURE);
            }
        };

        // Hold the lock for the rest of run(); dropping it removes the file
        let _lock = if self.create_lock {
            match instance::ensure_single_instance()? {
                Some(lock) => Some(lock),
                None => report_already_running(),
            }
        } else {
            None
        };

        let (sender, receiver) = mpsc::channel();
        let _signals = setup_signal_handler(sender.clone())?;

        if self.monitor_system_events {
            dbus::start_system_event_monitor(sender.clone(), self.debug_enabled);
        }
        drop(sender);

        config.log_config();

        let settings =
            ControllerSettings::from_config(&config).context("Invalid automation settings")?;
        let clock: Arc<dyn TimeSource> = Arc::new(RealTimeSource);
        let provider = location::provider::from_config(&config, Arc::clone(&clock));
        let store = FileLocationStore::in_state_dir()?;
        let applier = Arc::new(CommandThemeApplier::from_config(&config));
        let status_path = crate::state::status_path()?;

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Location provider: {}", provider.name());
            log_debug!(
                "Saved location: {}",
                crate::common::utils::private_path(store.path())
            );
        }

        log_block_start!("Starting themeshift...");

        let controller = AutomationController::new(
            settings,
            Some(provider),
            Box::new(store),
            applier,
            notify::from_config(config.notifications()),
            clock,
        )
        .with_observer(Box::new(StatusFileObserver::new(status_path.clone())))
        .with_observer(Box::<LogObserver>::default());

        controller.run(receiver);

        StatusFileObserver::new(status_path).remove();
        log_block_start!("Shut down cleanly");
        log_end!();
        Ok(())
    }
}

fn report_already_running() -> ! {
    let pid = instance::get_running_instance()
        .ok()
        .flatten()
        .map(|info| info.pid.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    log_pipe!();
    log_error!("themeshift is already running (PID: {pid})");
    log_block_start!("Did you mean to:");
    log_indented!("• Check the schedule: themeshift status");
    log_indented!("• Pause or resume: themeshift toggle");
    log_indented!("• Stop it: themeshift stop");
    log_block_start!("Cannot start - another themeshift instance is running");
    log_end!();
    std::process::exit(EXIT_FAILURE)
}
