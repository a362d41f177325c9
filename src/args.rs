//! Command-line argument parsing and processing.
//!
//! Global flags may appear anywhere on the line. The first bare word selects a
//! subcommand; without one the daemon runs in the foreground.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the automation daemon
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        log_file: Option<String>,
    },
    /// Print the running instance's last status
    StatusCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
        json: bool,
    },
    /// Pause or resume the running instance
    ToggleCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Terminate the running instance
    StopCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Print today's solar window without applying anything
    TimesCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
        coordinates: Option<(f64, f64)>,
    },
    /// Detailed help for one command
    HelpCommand { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;
        let mut config_dir: Option<String> = None;
        let mut log_file: Option<String> = None;
        let mut json = false;
        let mut latitude: Option<f64> = None;
        let mut longitude: Option<f64> = None;
        let mut words: Vec<String> = Vec::new();

        let mut i = 0;
        while i < args_vec.len() {
            let arg_str = args_vec[i].as_str();
            match arg_str {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--json" => json = true,
                "--config" | "-c" => match value_after(&args_vec, i) {
                    Some(dir) => {
                        config_dir = Some(dir.to_string());
                        i += 1;
                    }
                    None => {
                        log_warning!("Missing directory for --config. Usage: --config <directory>");
                        unknown_arg_found = true;
                    }
                },
                "--log" | "-l" => match value_after(&args_vec, i) {
                    Some(file) => {
                        log_file = Some(file.to_string());
                        i += 1;
                    }
                    None => {
                        log_warning!("Missing path for --log. Usage: --log <file>");
                        unknown_arg_found = true;
                    }
                },
                "--lat" | "--lon" => {
                    // Negative coordinates look like flags, so take the next word as-is
                    match args_vec.get(i + 1).map(|value| value.parse::<f64>()) {
                        Some(Ok(value)) => {
                            if arg_str == "--lat" {
                                latitude = Some(value);
                            } else {
                                longitude = Some(value);
                            }
                            i += 1;
                        }
                        _ => {
                            log_warning!("{arg_str} needs a number in degrees");
                            unknown_arg_found = true;
                        }
                    }
                }
                _ if arg_str.starts_with('-') => {
                    log_warning!("Unknown option: {arg_str}");
                    unknown_arg_found = true;
                }
                _ => words.push(arg_str.to_string()),
            }
            i += 1;
        }

        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if unknown_arg_found {
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let mut words = words.into_iter();
        let command = words.next();
        let argument = words.next();
        let extra = words.next();

        if display_help {
            // `themeshift toggle --help` shows the toggle page
            let action = match command {
                Some(command) => CliAction::HelpCommand {
                    command: Some(command),
                },
                None => CliAction::ShowHelp,
            };
            return ParsedArgs { action };
        }

        let Some(command) = command else {
            return ParsedArgs {
                action: CliAction::Run {
                    debug_enabled,
                    config_dir,
                    log_file,
                },
            };
        };

        let takes_argument = matches!(command.as_str(), "help" | "h");
        if extra.is_some() || (argument.is_some() && !takes_argument) {
            let unexpected = if takes_argument { extra } else { argument };
            log_error!(
                "Unexpected argument '{}' for '{}'",
                unexpected.unwrap_or_default(),
                command
            );
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let action = match command.as_str() {
            "status" | "S" => CliAction::StatusCommand {
                debug_enabled,
                config_dir,
                json,
            },
            "toggle" | "t" => CliAction::ToggleCommand {
                debug_enabled,
                config_dir,
            },
            "stop" | "s" => CliAction::StopCommand {
                debug_enabled,
                config_dir,
            },
            "times" | "T" => match (latitude, longitude) {
                (Some(lat), Some(lon)) => CliAction::TimesCommand {
                    debug_enabled,
                    config_dir,
                    coordinates: Some((lat, lon)),
                },
                (None, None) => CliAction::TimesCommand {
                    debug_enabled,
                    config_dir,
                    coordinates: None,
                },
                _ => {
                    log_warning!("--lat and --lon must be given together");
                    CliAction::ShowHelpDueToError
                }
            },
            "help" | "h" => CliAction::HelpCommand { command: argument },
            unknown => {
                log_warning!("Unknown command: {unknown}");
                CliAction::ShowHelpDueToError
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

fn value_after(args: &[String], index: usize) -> Option<&str> {
    args.get(index + 1)
        .map(String::as_str)
        .filter(|value| !value.starts_with('-'))
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("themeshift [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-l, --log <file>       Write log output to a file");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("status, S [--json]     Show the running instance's theme and schedule");
    log_indented!("toggle, t              Pause or resume automatic switching");
    log_indented!("stop, s                Stop the running instance");
    log_indented!("times, T [--lat --lon] Show today's sunrise and sunset");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_action(debug_enabled: bool, config_dir: Option<&str>) -> CliAction {
        CliAction::Run {
            debug_enabled,
            config_dir: config_dir.map(str::to_string),
            log_file: None,
        }
    }

    #[test]
    fn test_parse_no_args() {
        let parsed = ParsedArgs::parse(vec!["themeshift"]);
        assert_eq!(parsed.action, run_action(false, None));
    }

    #[test]
    fn test_parse_debug_flags() {
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "--debug"]).action,
            run_action(true, None)
        );
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "-d"]).action,
            run_action(true, None)
        );
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "--help"]).action,
            CliAction::ShowHelp
        );
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "-h"]).action,
            CliAction::ShowHelp
        );
        for flag in ["--version", "-V", "-v"] {
            assert_eq!(
                ParsedArgs::parse(vec!["themeshift", flag]).action,
                CliAction::ShowVersion
            );
        }
        // Version wins over help
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "--help", "--version"]).action,
            CliAction::ShowVersion
        );
    }

    #[test]
    fn test_parse_config_and_log() {
        let parsed = ParsedArgs::parse(vec![
            "themeshift",
            "--config",
            "/tmp/conf",
            "--log",
            "/tmp/themeshift.log",
        ]);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                debug_enabled: false,
                config_dir: Some("/tmp/conf".to_string()),
                log_file: Some("/tmp/themeshift.log".to_string()),
            }
        );

        let parsed = ParsedArgs::parse(vec!["themeshift", "--config"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_unknown_flag() {
        let parsed = ParsedArgs::parse(vec!["themeshift", "--unknown"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_subcommands() {
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "status", "--json"]).action,
            CliAction::StatusCommand {
                debug_enabled: false,
                config_dir: None,
                json: true,
            }
        );
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "-d", "toggle"]).action,
            CliAction::ToggleCommand {
                debug_enabled: true,
                config_dir: None,
            }
        );
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "stop", "-c", "/tmp/conf"]).action,
            CliAction::StopCommand {
                debug_enabled: false,
                config_dir: Some("/tmp/conf".to_string()),
            }
        );
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "help", "times"]).action,
            CliAction::HelpCommand {
                command: Some("times".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_times_coordinates() {
        let parsed = ParsedArgs::parse(vec!["themeshift", "times", "--lat", "-33.87", "--lon", "151.21"]);
        assert_eq!(
            parsed.action,
            CliAction::TimesCommand {
                debug_enabled: false,
                config_dir: None,
                coordinates: Some((-33.87, 151.21)),
            }
        );

        let parsed = ParsedArgs::parse(vec!["themeshift", "times", "--lat", "10"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);

        let parsed = ParsedArgs::parse(vec!["themeshift", "times", "--lat", "north"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_command_help_flag() {
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "toggle", "--help"]).action,
            CliAction::HelpCommand {
                command: Some("toggle".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_rejects_extra_words() {
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "stop", "now"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["themeshift", "frobnicate"]).action,
            CliAction::ShowHelpDueToError
        );
    }
}
