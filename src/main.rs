//! Binary entry point: parse arguments and dispatch.

use anyhow::Result;
use themeshift::args::{self, CliAction, ParsedArgs};
use themeshift::commands;
use themeshift::logger::Log;
use themeshift::{ThemeShift, config, log_error_exit};

fn main() -> Result<()> {
    let parsed = ParsedArgs::from_env();

    match parsed.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(1)
        }
        CliAction::HelpCommand { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Run {
            debug_enabled,
            config_dir,
            log_file,
        } => {
            use_config_dir(config_dir)?;
            let _log_guard = match log_file {
                Some(path) => Some(Log::start_file_logging(path)?),
                None => None,
            };
            ThemeShift::new(debug_enabled).run()
        }
        CliAction::StatusCommand {
            config_dir, json, ..
        } => {
            use_config_dir(config_dir)?;
            commands::status::handle_status_command(json)
        }
        CliAction::ToggleCommand {
            debug_enabled,
            config_dir,
        } => {
            use_config_dir(config_dir)?;
            commands::toggle::handle_toggle_command(debug_enabled)
        }
        CliAction::StopCommand {
            debug_enabled,
            config_dir,
        } => {
            use_config_dir(config_dir)?;
            commands::stop::handle_stop_command(debug_enabled)
        }
        CliAction::TimesCommand {
            debug_enabled,
            config_dir,
            coordinates,
        } => {
            use_config_dir(config_dir)?;
            commands::times::handle_times_command(coordinates, debug_enabled)
        }
    }
}

fn use_config_dir(config_dir: Option<String>) -> Result<()> {
    if config_dir.is_none() {
        return Ok(());
    }
    if let Err(e) = config::set_config_dir(config_dir) {
        log_error_exit!("Invalid config directory: {e}");
        std::process::exit(1);
    }
    Ok(())
}
