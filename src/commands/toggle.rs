//! Implementation of the toggle command.
//!
//! Sends SIGUSR1 to the running instance, which pauses automation when it is
//! running and resumes it (with an immediate re-evaluation) when paused.

use anyhow::Result;
use std::time::Duration;

use crate::controller::{Lifecycle, observer::read_status_file};

// How long to wait for the daemon to publish its new lifecycle
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(2);

/// Handle the toggle command.
pub fn handle_toggle_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let Some(instance) = crate::io::instance::get_running_instance()? else {
        log_error_exit!("themeshift isn't running");
        return Ok(());
    };

    let status_path = crate::state::status_path()?;
    let before = read_status_file(&status_path)
        .ok()
        .flatten()
        .map(|snapshot| snapshot.lifecycle);

    crate::io::instance::send_toggle_signal(instance.pid)?;
    if debug_enabled {
        log_pipe!();
        log_debug!("SIGUSR1 sent to process {}", instance.pid);
    }

    let deadline = std::time::Instant::now() + CONFIRM_TIMEOUT;
    while std::time::Instant::now() < deadline {
        let after = read_status_file(&status_path)
            .ok()
            .flatten()
            .map(|snapshot| snapshot.lifecycle);

        if after != before {
            match after {
                Some(Lifecycle::Paused) => log_block_start!("Automation paused"),
                Some(Lifecycle::Running) => log_block_start!("Automation resumed"),
                _ => log_block_start!("Toggle sent"),
            }
            log_end!();
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    log_pipe!();
    log_warning!("Toggle signal sent, but the new state was not confirmed");
    log_end!();
    Ok(())
}

/// Display detailed help for the toggle command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("toggle - Pause or resume automatic switching");
    log_block_start!("Usage: themeshift toggle");
    log_block_start!("Description:");
    log_indented!("Pauses the running instance, or resumes it if paused.");
    log_indented!("While paused the theme is left as it is. Resuming");
    log_indented!("re-evaluates the schedule immediately.");
    log_block_start!("Examples:");
    log_indented!("# Keep the current theme for a while");
    log_indented!("themeshift toggle");
    log_end!();
}
