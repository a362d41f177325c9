//! Help command implementation for themeshift.
//!
//! Dispatches to the command-specific help page, or shows the command list.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("help") | Some("h") => display_help_help(),
        Some("status") | Some("S") => super::status::display_help(),
        Some("stop") | Some("s") => super::stop::display_help(),
        Some("times") | Some("T") => super::times::display_help(),
        Some("toggle") | Some("t") => super::toggle::display_help(),
        Some(unknown) => {
            log_warning_standalone!("Unknown command: {unknown}");
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("help, h [COMMAND]       Show detailed help for a command");
    log_indented!("status, S [--json]      Show the current theme and schedule");
    log_indented!("stop, s                 Stop the running instance");
    log_indented!("times, T                Show today's sunrise and sunset");
    log_indented!("toggle, t               Pause or resume automatic switching");
    log_pipe!();
    log_info!("Use 'themeshift help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'themeshift --help' to see all options and general usage.");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: themeshift help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("# Show general help");
    log_indented!("themeshift help");
    log_pipe!();
    log_indented!("# Show help for specific commands");
    log_indented!("themeshift help status");
    log_indented!("themeshift help times");
    log_end!();
}
