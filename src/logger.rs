//! Structured logging with box-drawing output.
//!
//! Every user-facing line goes through the `log_*` macros exported here so the
//! daemon, the one-shot commands and the log file all share the same layout.
//! Output can be silenced at runtime (tests, `status --json`) and routed to a
//! file with `--log`, in which case ANSI colors are stripped and each line gets
//! a wall-clock timestamp.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Timestamps are only useful once output leaves the terminal
static TIMESTAMPS_ENABLED: AtomicBool = AtomicBool::new(false);

// Channel for routing output to file when --log is active
static LOG_CHANNEL: OnceLock<Option<Sender<LogMessage>>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Main logging interface providing structured output formatting.
///
/// ## Logging Conventions
///
/// - **`log_block_start!`** opens a new conceptual block (`┃` spacer, then
///   `┣ message`). Follow it with `log_decorated!` or `log_indented!`.
/// - **`log_decorated!`** prints `┣ message` inside the current block.
/// - **`log_indented!`** prints `┃   message` for nested details.
/// - **`log_pipe!`** prints a lone `┃` spacer, typically before a semantic
///   `log_info!`/`log_warning!`/`log_error!`/`log_debug!` line.
/// - **`log_version!`** prints the `┏ themeshift vX.Y.Z ━━╸` header once.
/// - **`log_end!`** prints the closing `╹`.
/// - **`log_error_exit!`** closes the flow with `┗[ERROR] message`.
pub struct Log;

impl Log {
    /// Enable or disable logging temporarily.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Prefix every line with the local wall-clock time.
    pub fn set_timestamps(enabled: bool) {
        TIMESTAMPS_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Start file logging to the specified path.
    ///
    /// Timestamps are switched on for the lifetime of the process.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(Some(tx.clone()))
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;
        Self::set_timestamps(true);

        let handle = std::thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&file_path)?;

                loop {
                    match rx.recv() {
                        Ok(LogMessage::Formatted(text)) => {
                            file.write_all(text.as_bytes())?;
                        }
                        Ok(LogMessage::Shutdown) | Err(_) => {
                            file.flush()?;
                            break;
                        }
                    }
                }

                Ok::<(), anyhow::Error>(())
            })?;

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix used by the macros, empty unless timestamps are on.
    pub fn get_timestamp_prefix() -> String {
        if TIMESTAMPS_ENABLED.load(Ordering::Relaxed) {
            format!("[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Guard for file logging that flushes and joins the writer thread on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove `ESC [ ... m` color sequences.
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// Public because the exported macros expand to calls of it
pub fn write_output(text: &str) {
    if let Some(Some(tx)) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Write one line per `lead`, each carrying the timestamp prefix.
///
/// The last lead is followed by `message`; earlier leads are written alone,
/// which is how `log_block_start!` and `log_error_exit!` get their spacer.
pub fn emit(leads: &[&str], message: &str) {
    let prefix = Log::get_timestamp_prefix();
    let mut text = String::new();
    if let Some((last, spacers)) = leads.split_last() {
        for spacer in spacers {
            text.push_str(&format!("{prefix}{spacer}\n"));
        }
        text.push_str(&format!("{prefix}{last}{message}\n"));
    }
    write_output(&text);
}

// # Logging Macros

/// Format either a literal with arguments or any `Display` expression.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_message {
    ($fmt:literal $($arg:tt)*) => {
        format!($fmt $($arg)*)
    };
    ($expr:expr) => {
        format!("{}", $expr)
    };
}

/// Emit `message` behind the given line leads when logging is enabled.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_emit {
    ([$($lead:expr),+], $($arg:tt)+) => {{
        if $crate::logger::Log::is_enabled() {
            let message = $crate::__log_message!($($arg)+);
            $crate::logger::emit(&[$($lead),+], &message);
        }
    }};
}

/// Log a decorated message as part of the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["┣ "], $($arg)+)
    };
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["┃   "], $($arg)+)
    };
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::__log_emit!(["┃"], "")
    };
}

/// Start a new conceptual block of information.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["┃", "┣ "], $($arg)+)
    };
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::__log_emit!(["┏ "], "themeshift v{} ━━╸", env!("CARGO_PKG_VERSION"))
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::__log_emit!(["╹"], "")
    };
}

/// Log a warning in yellow.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["┣[\x1b[33mWARNING\x1b[0m] "], $($arg)+)
    };
}

/// Log a warning outside of any block (no pipe prefix).
#[macro_export]
macro_rules! log_warning_standalone {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["[\x1b[33mWARNING\x1b[0m] "], $($arg)+)
    };
}

/// Log an error outside of any block (no pipe prefix).
#[macro_export]
macro_rules! log_error_standalone {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["[\x1b[31mERROR\x1b[0m] "], $($arg)+)
    };
}

/// Log an error in red.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["┣[\x1b[31mERROR\x1b[0m] "], $($arg)+)
    };
}

/// Log an error that terminates the current flow (`┗` corner).
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["┃", "┗[\x1b[31mERROR\x1b[0m] "], $($arg)+)
    };
}

/// Log an informational message in green.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["┣[\x1b[32mINFO\x1b[0m] "], $($arg)+)
    };
}

/// Log a debug/operational message.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["┣[\x1b[36mDEBUG\x1b[0m] "], $($arg)+)
    };
}

/// Log a critical message in red.
#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => {
        $crate::__log_emit!(["┣[\x1b[31mCRITICAL\x1b[0m] "], $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        assert_eq!(
            strip_ansi_codes("┣[\x1b[33mWARNING\x1b[0m] careful"),
            "┣[WARNING] careful"
        );
        assert_eq!(strip_ansi_codes("plain text"), "plain text");
        assert_eq!(strip_ansi_codes("\x1bnot a sequence"), "\x1bnot a sequence");
    }

    #[test]
    fn test_timestamp_prefix_disabled_by_default() {
        assert!(Log::get_timestamp_prefix().is_empty());
    }
}
