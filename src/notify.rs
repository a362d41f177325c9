//! User-facing notifications for degraded states.
//!
//! Notifications are fire-and-forget: a sink never blocks the controller
//! and never reports failure back to it.

use std::process::{Command, Stdio};

use crate::common::constants::NOTIFY_SEND_COMMAND;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn urgency(self) -> &'static str {
        match self {
            Severity::Info => "low",
            Severity::Warning => "normal",
            Severity::Error => "critical",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send {
    fn notify(&self, message: &str, severity: Severity);
}

/// Writes notifications to the structured log.
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => log_info!("{message}"),
            Severity::Warning => log_warning!("{message}"),
            Severity::Error => log_error!("{message}"),
        }
    }
}

/// Logs, then shows a desktop notification through `notify-send`.
pub struct DesktopNotifier;

impl NotificationSink for DesktopNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        LogNotifier.notify(message, severity);

        let message = message.to_string();
        let spawned = std::thread::Builder::new()
            .name("notify-send".to_string())
            .spawn(move || {
                let result = Command::new(NOTIFY_SEND_COMMAND)
                    .args(["--app-name", "themeshift", "--urgency"])
                    .arg(severity.urgency())
                    .arg("themeshift")
                    .arg(&message)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status();
                if let Err(e) = result {
                    log_debug!("notify-send unavailable: {e}");
                }
            });

        if let Err(e) = spawned {
            log_debug!("Failed to spawn notification thread: {e}");
        }
    }
}

/// Pick the sink the config asks for.
pub fn from_config(desktop: bool) -> Box<dyn NotificationSink> {
    if desktop {
        Box::new(DesktopNotifier)
    } else {
        Box::new(LogNotifier)
    }
}
