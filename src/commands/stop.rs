//! Implementation of the stop command.
//!
//! This command cleanly terminates a running themeshift instance by sending
//! SIGTERM and waiting for the process to exit.

use anyhow::Result;
use std::time::Duration;

const STOP_TIMEOUT: Duration = Duration::from_secs(3);

/// Handle the stop command to terminate a running themeshift instance.
pub fn handle_stop_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let Some(instance) = crate::io::instance::get_running_instance()? else {
        log_error_exit!("themeshift isn't running");
        return Ok(());
    };

    log_block_start!("Stopping themeshift instance (PID: {})...", instance.pid);

    if let Err(e) = crate::io::instance::terminate_instance(instance.pid) {
        log_error_exit!("Failed to terminate instance: {e}");
        return Ok(());
    }

    if debug_enabled {
        log_pipe!();
        log_debug!("SIGTERM sent to process {}", instance.pid);
    }

    log_pipe!();
    if crate::io::instance::wait_for_exit(instance.pid, STOP_TIMEOUT) {
        log_info!("Process terminated successfully");
    } else {
        log_warning!("Process did not terminate within the expected time");
        log_indented!(
            "The termination signal was sent, but the process may still be shutting down"
        );
    }
    log_end!();
    Ok(())
}

/// Display detailed help for the stop command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("stop - Cleanly terminate running themeshift");
    log_block_start!("Usage: themeshift stop");
    log_block_start!("Description:");
    log_indented!("Sends a termination signal to the running themeshift instance");
    log_indented!("and waits up to 3 seconds for it to exit. The current theme");
    log_indented!("is left in place.");
    log_block_start!("Examples:");
    log_indented!("# Stop running themeshift");
    log_indented!("themeshift stop");
    log_pipe!();
    log_indented!("# Stop with debug output");
    log_indented!("themeshift --debug stop");
    log_end!();
}
