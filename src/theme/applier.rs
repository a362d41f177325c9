//! Theme applier backed by user-configured shell commands.
//!
//! The defaults switch the GNOME `color-scheme` key, which GTK4/libadwaita
//! apps and the XDG settings portal follow. Any other desktop can be driven
//! by replacing `dark_command` and `light_command` in the config.

use anyhow::{Result, bail};
use std::time::Duration;

use super::{DisplayState, ThemeApplier};
use crate::config::Config;
use crate::io::command::run_shell;

pub struct CommandThemeApplier {
    dark_command: String,
    light_command: String,
    timeout: Duration,
}

impl CommandThemeApplier {
    pub fn new(dark_command: String, light_command: String, timeout: Duration) -> Self {
        Self {
            dark_command,
            light_command,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.dark_command(),
            config.light_command(),
            config.apply_timeout(),
        )
    }

    fn command_for(&self, state: DisplayState) -> &str {
        match state {
            DisplayState::Dark => &self.dark_command,
            DisplayState::Light => &self.light_command,
        }
    }
}

impl ThemeApplier for CommandThemeApplier {
    fn apply(&self, state: DisplayState) -> Result<()> {
        let command = self.command_for(state);
        let output = run_shell(command, self.timeout)?;

        if !output.status.success() {
            bail!(
                "{} theme command failed: {}",
                state,
                output.failure_reason()
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_apply_runs_command_for_state() {
        let dir = tempdir().unwrap();
        let marker = dir.path().join("theme");
        let applier = CommandThemeApplier::new(
            format!("echo dark > {}", marker.display()),
            format!("echo light > {}", marker.display()),
            Duration::from_secs(5),
        );

        applier.apply(DisplayState::Dark).unwrap();
        assert_eq!(std::fs::read_to_string(&marker).unwrap().trim(), "dark");

        applier.apply(DisplayState::Light).unwrap();
        assert_eq!(std::fs::read_to_string(&marker).unwrap().trim(), "light");
    }

    #[test]
    fn test_apply_fails_on_nonzero_exit() {
        let applier = CommandThemeApplier::new(
            "echo 'no such schema' >&2; exit 1".to_string(),
            "true".to_string(),
            Duration::from_secs(5),
        );

        let err = applier.apply(DisplayState::Dark).unwrap_err();
        assert!(err.to_string().contains("no such schema"));
        assert!(applier.apply(DisplayState::Light).is_ok());
    }
}
