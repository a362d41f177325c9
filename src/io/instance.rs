//! High-level instance management for themeshift processes.
//!
//! Coordinates instances through the lock file in `io::lock`: finding the
//! running daemon, signalling it, and refusing to start a second one.

use anyhow::{Context, Result};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::io::lock::{self, LockFile};

/// Information about a running themeshift instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceInfo {
    pub pid: u32,
    /// Custom config directory if set
    pub config_dir: Option<PathBuf>,
}

impl InstanceInfo {
    /// Describe the current process.
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            config_dir: crate::config::get_custom_config_dir(),
        }
    }

    /// Parse instance info from lock file contents.
    pub fn from_lock_contents(contents: &str) -> Result<Self> {
        let lines: Vec<&str> = contents.trim_end().lines().collect();

        if lines.is_empty() {
            anyhow::bail!("Lock file is empty");
        }
        if lines.len() > 2 {
            anyhow::bail!("Invalid lock file format (expected 1-2 lines)");
        }

        let pid = lines[0]
            .trim()
            .parse::<u32>()
            .context("Invalid PID format in lock file")?;

        let config_dir = lines
            .get(1)
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(PathBuf::from);

        Ok(InstanceInfo { pid, config_dir })
    }

    /// Serialize instance info to lock file format.
    pub fn to_lock_contents(&self) -> String {
        match self.config_dir {
            Some(ref dir) => format!("{}\n{}", self.pid, dir.display()),
            None => format!("{}\n", self.pid),
        }
    }
}

/// Get information about the running instance, if any.
///
/// Restores the instance's config directory for this process so commands
/// operate on the same files as the daemon.
pub fn get_running_instance() -> Result<Option<InstanceInfo>> {
    let lock_path = lock::get_main_lock_path();

    let Ok(lock_content) = std::fs::read_to_string(&lock_path) else {
        return Ok(None);
    };

    let info = InstanceInfo::from_lock_contents(&lock_content)?;

    if let Some(ref config_dir) = info.config_dir {
        // Already set when the user passed --config
        let _ = crate::config::set_config_dir(Some(config_dir.display().to_string()));
    }

    if is_instance_running(info.pid) {
        Ok(Some(info))
    } else {
        Ok(None)
    }
}

/// Check if a process with the given PID is still running.
pub fn is_instance_running(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// Terminate an instance by sending SIGTERM.
pub fn terminate_instance(pid: u32) -> Result<()> {
    kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        .map_err(|e| anyhow::anyhow!("Failed to send SIGTERM to process: {e}"))
}

/// Ask an instance to flip automation on or off (SIGUSR1).
pub fn send_toggle_signal(pid: u32) -> Result<()> {
    kill(Pid::from_raw(pid as i32), Signal::SIGUSR1)
        .map_err(|e| anyhow::anyhow!("Failed to send toggle signal: {e}"))
}

/// Ask an instance to re-evaluate immediately (SIGUSR2).
pub fn send_refresh_signal(pid: u32) -> Result<()> {
    kill(Pid::from_raw(pid as i32), Signal::SIGUSR2)
        .map_err(|e| anyhow::anyhow!("Failed to send refresh signal: {e}"))
}

/// Wait until `pid` exits. Returns false on timeout.
pub fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if !is_instance_running(pid) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    !is_instance_running(pid)
}

/// Take the main lock for this process.
///
/// Returns `Ok(None)` when another live instance owns it; the caller decides
/// how to report that.
pub fn ensure_single_instance() -> Result<Option<LockFile>> {
    acquire_at(&lock::get_main_lock_path())
}

fn acquire_at(lock_path: &Path) -> Result<Option<LockFile>> {
    if let Some(mut lock) = LockFile::try_acquire(lock_path)? {
        lock.write(&InstanceInfo::current().to_lock_contents())?;
        return Ok(Some(lock));
    }

    if !resolve_lock_conflict(lock_path) {
        return Ok(None);
    }

    match LockFile::try_acquire(lock_path)? {
        Some(mut lock) => {
            lock.write(&InstanceInfo::current().to_lock_contents())?;
            Ok(Some(lock))
        }
        None => anyhow::bail!("Failed to acquire lock after conflict resolution"),
    }
}

/// Clear a lock left behind by a dead or unidentifiable owner.
///
/// Returns true when the lock was cleared and acquisition may be retried.
fn resolve_lock_conflict(lock_path: &Path) -> bool {
    let Ok(lock_content) = std::fs::read_to_string(lock_path) else {
        return true;
    };

    let info = match InstanceInfo::from_lock_contents(&lock_content) {
        Ok(info) => info,
        Err(_) => {
            log_warning!("Lock file format invalid, removing");
            let _ = std::fs::remove_file(lock_path);
            return true;
        }
    };

    if !is_instance_running(info.pid) {
        log_warning!(
            "Removing stale lock file (process {} no longer running)",
            info.pid
        );
        let _ = std::fs::remove_file(lock_path);
        return true;
    }

    false
}
