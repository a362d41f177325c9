//! Shell command execution with a hard deadline.
//!
//! Theme changes and the optional location command are user-configurable
//! shell commands, so they can hang on the network or a misbehaving tool.
//! Each command runs in its own process group and the whole group is killed
//! when the deadline passes. The deadline also covers reading the output: a
//! background child that keeps stdout or stderr open counts as still running.

use anyhow::{Context, Result, bail};
use std::io::Read;
use std::os::unix::process::CommandExt;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::common::constants::COMMAND_POLL_INTERVAL_MS;

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// First non-empty stderr line, or the exit status when stderr is silent.
    pub fn failure_reason(&self) -> String {
        self.stderr
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.status.to_string())
    }
}

/// Run `command` through `sh -c`, killing it after `timeout`.
///
/// A non-zero exit is not an error here; callers inspect `status`. Running
/// out of time, whether waiting for the exit or for the output, is.
pub fn run_shell(command: &str, timeout: Duration) -> Result<CommandOutput> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
        .with_context(|| format!("Failed to start `{command}`"))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            kill_group(child.id());
            let _ = child.wait();
            bail!("`{command}` timed out after {:.1}s", timeout.as_secs_f64());
        }
        std::thread::sleep(Duration::from_millis(COMMAND_POLL_INTERVAL_MS));
    };

    // Something left in the group may still hold the pipes open
    let (Some(stdout), Some(stderr)) = (collect(&stdout, deadline), collect(&stderr, deadline))
    else {
        kill_group(child.id());
        bail!(
            "`{command}` timed out after {:.1}s waiting for its output",
            timeout.as_secs_f64()
        );
    };

    Ok(CommandOutput {
        status,
        stdout,
        stderr,
    })
}

/// Read `pipe` to the end on a helper thread.
///
/// The receiver disconnects without a value when there is nothing to read.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        let spawned = std::thread::Builder::new()
            .name("command-output".to_string())
            .spawn(move || {
                let mut buffer = Vec::new();
                let _ = pipe.read_to_end(&mut buffer);
                let _ = tx.send(String::from_utf8_lossy(&buffer).into_owned());
            });
        if let Err(e) = spawned {
            log_debug!("Failed to spawn output reader: {e}");
        }
    }
    rx
}

/// Drained output, or `None` when `deadline` passes first.
fn collect(output: &Receiver<String>, deadline: Instant) -> Option<String> {
    match output.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

fn kill_group(pid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    // The child leads its own group, so this also reaches anything it spawned
    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        log_debug!("Failed to kill process group {pid}: {e}");
    }
}
