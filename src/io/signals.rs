//! Unix signal handling for the daemon.
//!
//! Signals are translated into [`ControlMessage`]s and delivered on the same
//! channel the controller's run loop reads:
//! - SIGUSR1: toggle automation (`themeshift toggle`)
//! - SIGUSR2: re-evaluate immediately
//! - SIGINT, SIGTERM, SIGHUP: shut down

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2},
    iterator::{Handle, Signals},
};
use std::sync::mpsc::Sender;
use std::thread;

use crate::controller::ControlMessage;

/// Keeps the signal thread alive. Dropping it stops signal delivery.
pub struct SignalGuard {
    handle: Handle,
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
    }
}

/// Map a received signal to the message it stands for.
pub fn message_for_signal(signal: i32) -> Option<ControlMessage> {
    match signal {
        SIGUSR1 => Some(ControlMessage::Toggle),
        SIGUSR2 => Some(ControlMessage::TickNow),
        SIGINT | SIGTERM | SIGHUP => Some(ControlMessage::Shutdown),
        _ => None,
    }
}

fn describe(signal: i32) -> &'static str {
    match signal {
        SIGUSR1 => "toggle",
        SIGUSR2 => "refresh",
        SIGINT => "interrupt",
        SIGTERM => "termination",
        SIGHUP => "hangup",
        _ => "unknown",
    }
}

/// Register handlers and spawn the thread that forwards signals to `sender`.
pub fn setup_signal_handler(sender: Sender<ControlMessage>) -> Result<SignalGuard> {
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1, SIGUSR2])
        .context("failed to register signal handlers")?;
    let handle = signals.handle();

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                let Some(message) = message_for_signal(sig) else {
                    continue;
                };

                log_pipe!();
                log_info!("Received {} signal", describe(sig));

                if sender.send(message).is_err() {
                    // Controller is gone
                    break;
                }
            }
        })
        .context("failed to spawn signal thread")?;

    Ok(SignalGuard { handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_mapping() {
        assert_eq!(message_for_signal(SIGUSR1), Some(ControlMessage::Toggle));
        assert_eq!(message_for_signal(SIGUSR2), Some(ControlMessage::TickNow));
        for sig in [SIGINT, SIGTERM, SIGHUP] {
            assert_eq!(message_for_signal(sig), Some(ControlMessage::Shutdown));
        }
        assert_eq!(message_for_signal(0), None);
    }
}
