//! System event monitoring.
//!
//! Two background threads ask the controller for an immediate tick:
//! - on resume from suspend, via the systemd-logind `PrepareForSleep` signal
//! - on wall-clock changes, via a timerfd armed with `TFD_TIMER_CANCEL_ON_SET`
//!
//! Both degrade gracefully: if D-Bus or timerfd is unavailable the daemon
//! keeps working on its regular poll interval.

use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::sys::time::TimeSpec;
use nix::sys::timerfd::{ClockId, Expiration, TimerFd, TimerFlags, TimerSetTimeFlags};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use zbus::blocking::Connection;

use crate::controller::ControlMessage;

const MAX_THREAD_RESTARTS: u8 = 3;
const RESTART_DELAY: Duration = Duration::from_secs(2);
// Clock jumps right after resume come from the suspend itself
const RESUME_GRACE_SECONDS: i64 = 5;

#[zbus::proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1"
)]
trait LogindManager {
    /// `start` is true before suspend and false after resume.
    #[zbus(signal)]
    fn prepare_for_sleep(&self, start: bool) -> zbus::Result<()>;
}

/// Sleep state shared by the two monitors.
#[derive(Clone, Default)]
struct SleepTracker {
    is_sleeping: Arc<AtomicBool>,
    resume_time: Arc<AtomicI64>,
}

impl SleepTracker {
    fn current_timestamp() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn mark_sleeping(&self) {
        self.is_sleeping.store(true, Ordering::SeqCst);
    }

    fn mark_resumed(&self) {
        self.resume_time
            .store(Self::current_timestamp(), Ordering::SeqCst);
        self.is_sleeping.store(false, Ordering::SeqCst);
    }

    /// True when a clock change is explained by suspend/resume.
    fn explains_clock_change(&self) -> bool {
        if self.is_sleeping.load(Ordering::SeqCst) {
            return true;
        }
        let resume_time = self.resume_time.load(Ordering::SeqCst);
        resume_time != 0 && Self::current_timestamp() - resume_time <= RESUME_GRACE_SECONDS
    }
}

/// Start the sleep/resume and time change monitors.
pub fn start_system_event_monitor(sender: Sender<ControlMessage>, debug_enabled: bool) {
    let tracker = SleepTracker::default();

    {
        let sender = sender.clone();
        let tracker = tracker.clone();
        let spawned = thread::Builder::new()
            .name("sleep-monitor".to_string())
            .spawn(move || run_sleep_monitor(sender, debug_enabled, tracker));
        if let Err(e) = spawned {
            log_warning!("Failed to start sleep monitor: {e}");
        }
    }

    let spawned = thread::Builder::new()
        .name("time-monitor".to_string())
        .spawn(move || {
            if let Err(e) = monitor_time_changes(sender, debug_enabled, tracker) {
                log_pipe!();
                log_warning!("Time change monitor error: {e}");
                log_indented!("System time change detection will not be available");
            }
        });
    if let Err(e) = spawned {
        log_warning!("Failed to start time change monitor: {e}");
    }
}

fn run_sleep_monitor(sender: Sender<ControlMessage>, debug_enabled: bool, tracker: SleepTracker) {
    for attempt in 0..=MAX_THREAD_RESTARTS {
        match monitor_sleep_signals(&sender, debug_enabled, &tracker) {
            Ok(()) => {
                if debug_enabled {
                    log_debug!("Sleep monitor thread exiting normally");
                }
                return;
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Sleep monitor error: {e}");
                if attempt == MAX_THREAD_RESTARTS {
                    log_indented!("Maximum restart attempts reached for sleep monitor");
                    log_indented!("Sleep/resume detection will not be available");
                    return;
                }
                log_indented!(
                    "Will restart D-Bus monitor (attempt {}/{})",
                    attempt + 1,
                    MAX_THREAD_RESTARTS
                );
                thread::sleep(RESTART_DELAY);
            }
        }
    }
}

/// Returns `Ok(())` when the controller hung up, `Err` when D-Bus failed.
fn monitor_sleep_signals(
    sender: &Sender<ControlMessage>,
    debug_enabled: bool,
    tracker: &SleepTracker,
) -> Result<()> {
    let connection = Connection::system().context("Failed to connect to system D-Bus")?;
    let logind_proxy =
        LogindManagerProxyBlocking::new(&connection).context("Failed to create logind proxy")?;
    let sleep_signals = logind_proxy
        .receive_prepare_for_sleep()
        .context("Failed to subscribe to PrepareForSleep signals")?;

    if debug_enabled {
        log_debug!("Subscribed to systemd-logind PrepareForSleep signals");
    }

    for signal in sleep_signals {
        let args = match signal.args() {
            Ok(args) => args,
            Err(e) => {
                log_pipe!();
                log_warning!("Failed to parse PrepareForSleep signal args: {e}");
                continue;
            }
        };

        if args.start {
            tracker.mark_sleeping();
            log_pipe!();
            log_info!("System entering sleep/suspend mode");
            continue;
        }

        tracker.mark_resumed();
        log_pipe!();
        log_info!("System resuming from sleep/suspend, re-evaluating");
        if sender.send(ControlMessage::TickNow).is_err() {
            return Ok(());
        }
    }

    anyhow::bail!("D-Bus connection lost, PrepareForSleep signal stream ended")
}

/// A far-future timer that only fires when the wall clock is set.
struct TimeChangeDetector {
    timer: TimerFd,
}

impl TimeChangeDetector {
    fn new() -> nix::Result<Self> {
        let timer = TimerFd::new(ClockId::CLOCK_REALTIME, TimerFlags::empty())?;
        let mut detector = TimeChangeDetector { timer };
        detector.arm_timer()?;
        Ok(detector)
    }

    fn arm_timer(&mut self) -> nix::Result<()> {
        let flags =
            TimerSetTimeFlags::TFD_TIMER_ABSTIME | TimerSetTimeFlags::TFD_TIMER_CANCEL_ON_SET;
        let far_future = TimeSpec::new(i64::MAX / 1000, 0);
        self.timer.set(Expiration::OneShot(far_future), flags)
    }

    fn wait_for_time_change(&mut self) -> Result<()> {
        match self.timer.wait() {
            Ok(()) | Err(Errno::ECANCELED) => {
                self.arm_timer().context("Failed to re-arm timer")?;
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!("Timer wait error: {e}")),
        }
    }
}

fn monitor_time_changes(
    sender: Sender<ControlMessage>,
    debug_enabled: bool,
    tracker: SleepTracker,
) -> Result<()> {
    let mut detector =
        TimeChangeDetector::new().context("Failed to create time change detector")?;

    if debug_enabled {
        log_debug!("Started timerfd-based time change monitoring");
    }

    loop {
        detector.wait_for_time_change()?;
        if tracker.explains_clock_change() {
            continue;
        }

        log_pipe!();
        log_info!("System time changed, re-evaluating");
        if sender.send(ControlMessage::TickNow).is_err() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_tracker_grace_period() {
        let tracker = SleepTracker::default();
        assert!(!tracker.explains_clock_change());

        tracker.mark_sleeping();
        assert!(tracker.explains_clock_change());

        tracker.mark_resumed();
        assert!(tracker.explains_clock_change());

        tracker
            .resume_time
            .store(SleepTracker::current_timestamp() - 60, Ordering::SeqCst);
        assert!(!tracker.explains_clock_change());
    }
}
