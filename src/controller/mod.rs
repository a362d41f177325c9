//! Theme automation controller.
//!
//! The controller owns the cached position, the current solar outcome and
//! the last applied display state, and is the only code that mutates them.
//! It runs on a single thread: ticks are driven by `recv_timeout` on its
//! control channel, so they never overlap. Location lookups and theme
//! changes run on helper threads (see [`worker`]) and are bounded by the
//! configured timeouts.
//!
//! ## Lifecycle
//!
//! `Initializing → Running ⇄ Paused → Stopped`
//!
//! - **Initializing**: seed the cache from the store, try one blocking
//!   lookup, compute today's outcome and apply the wanted state once.
//! - **Running**: every tick collects finished helper results, recomputes
//!   the outcome when the date or position changed, starts a background
//!   lookup when the cached one is stale, and applies the wanted state when
//!   it differs from the last applied one.
//! - **Paused**: no lookups, no recomputation, no applies. Resuming runs a
//!   tick immediately.
//!
//! Pause and shutdown bump a generation counter; helper results tagged with
//! an older generation are discarded. A helper that outlives its timeout is
//! abandoned: its result can no longer be received, and the work is retried
//! on a later tick.

pub mod observer;
pub(crate) mod worker;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::geo::{self, GeoPosition, PositionOrigin, SolarOutcome};
use crate::location::{LocationProvider, LocationStore};
use crate::notify::{NotificationSink, Severity};
use crate::theme::{DisplayState, ThemeApplier};
use crate::time::source::TimeSource;

pub use observer::{
    Lifecycle, LogObserver, StatusFileObserver, StatusHandle, StatusObserver, StatusSnapshot,
};
use worker::{PendingTask, TaskPoll};

/// Messages accepted by [`AutomationController::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Flip between running and paused.
    Toggle,
    SetEnabled(bool),
    /// Run a tick now (after resume from sleep or a clock change).
    TickNow,
    Shutdown,
}

/// Runtime settings resolved from the config.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub enabled: bool,
    pub poll_interval: Duration,
    pub location_refresh_interval: Duration,
    pub change_threshold: f64,
    pub location_timeout: Duration,
    pub apply_timeout: Duration,
    pub fallback_sunrise: NaiveTime,
    pub fallback_sunset: NaiveTime,
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let (fallback_sunrise, fallback_sunset) = config.fallback_times()?;
        Ok(Self {
            enabled: config.enabled(),
            poll_interval: config.poll_interval(),
            location_refresh_interval: config.location_refresh_interval(),
            change_threshold: config.change_threshold(),
            location_timeout: config.location_timeout(),
            apply_timeout: config.apply_timeout(),
            fallback_sunrise,
            fallback_sunset,
        })
    }
}

type RefreshResult = Result<GeoPosition>;
type ApplyResult = Result<()>;

pub struct AutomationController {
    settings: ControllerSettings,
    provider: Option<Arc<dyn LocationProvider>>,
    store: Box<dyn LocationStore>,
    applier: Arc<dyn ThemeApplier>,
    notifier: Box<dyn NotificationSink>,
    observers: Vec<Box<dyn StatusObserver>>,
    clock: Arc<dyn TimeSource>,

    lifecycle: Lifecycle,
    position: Option<GeoPosition>,
    origin: PositionOrigin,
    outcome: Option<SolarOutcome>,
    window_dirty: bool,
    last_applied: Option<DisplayState>,
    last_location_refresh: Option<DateTime<Utc>>,
    pending_refresh: Option<PendingTask<RefreshResult>>,
    pending_apply: Option<(DisplayState, PendingTask<ApplyResult>)>,
    generation: u64,
    status: StatusHandle,

    // Each degraded episode is reported once
    location_degraded: bool,
    apply_degraded: bool,
    reported_polar: Option<NaiveDate>,
}

impl AutomationController {
    pub fn new(
        settings: ControllerSettings,
        provider: Option<Arc<dyn LocationProvider>>,
        store: Box<dyn LocationStore>,
        applier: Arc<dyn ThemeApplier>,
        notifier: Box<dyn NotificationSink>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            settings,
            provider,
            store,
            applier,
            notifier,
            observers: Vec::new(),
            clock,
            lifecycle: Lifecycle::Initializing,
            position: None,
            origin: PositionOrigin::Default,
            outcome: None,
            window_dirty: false,
            last_applied: None,
            last_location_refresh: None,
            pending_refresh: None,
            pending_apply: None,
            generation: 0,
            status: StatusHandle::default(),
            location_degraded: false,
            apply_degraded: false,
            reported_polar: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn StatusObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Read access to the latest snapshot from other threads.
    pub fn status_handle(&self) -> StatusHandle {
        self.status.clone()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn last_applied(&self) -> Option<DisplayState> {
        self.last_applied
    }

    pub fn position(&self) -> Option<&GeoPosition> {
        self.position.as_ref()
    }

    pub fn position_origin(&self) -> PositionOrigin {
        self.origin
    }

    pub fn outcome(&self) -> Option<&SolarOutcome> {
        self.outcome.as_ref()
    }

    pub fn last_location_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_location_refresh
    }

    pub fn is_apply_in_flight(&self) -> bool {
        self.pending_apply.is_some()
    }

    pub fn is_refresh_in_flight(&self) -> bool {
        self.pending_refresh.is_some()
    }

    /// Seed the cache, look up the position once, and apply the initial state.
    ///
    /// Ends in `Running`, or in `Paused` without applying anything when
    /// automation starts disabled.
    pub fn initialize(&mut self) {
        self.lifecycle = Lifecycle::Initializing;

        match self.store.load() {
            Ok(Some(saved)) => {
                log_decorated!("Saved location: {saved}");
                self.position = Some(saved);
                self.origin = PositionOrigin::Persisted;
            }
            Ok(None) => {}
            Err(e) => log_warning!("Ignoring saved location: {e}"),
        }

        if let Some(provider) = self.provider.clone() {
            let now = self.clock.now();
            let timeout = self.settings.location_timeout;
            match worker::spawn("location-fetch", self.generation, move || {
                provider.fetch(timeout)
            }) {
                Ok(task) => match task.wait(timeout) {
                    TaskPoll::Ready(Ok(fresh)) => self.absorb_position(fresh, now),
                    TaskPoll::Ready(Err(e)) => self.location_failed(&e.to_string()),
                    TaskPoll::Pending => self.location_failed(&format!(
                        "no answer within {}s",
                        timeout.as_secs()
                    )),
                    TaskPoll::Lost => self.location_failed("lookup thread ended unexpectedly"),
                },
                Err(e) => self.location_failed(&e.to_string()),
            }
        }

        let today = self.clock.today();
        self.recompute_window(today);

        if self.settings.enabled {
            self.lifecycle = Lifecycle::Running;
            self.evaluate(self.clock.now());
        } else {
            log_decorated!("Automation is paused");
            self.lifecycle = Lifecycle::Paused;
            self.publish(self.clock.now());
        }
    }

    /// One pass of the control loop. Does nothing unless running.
    pub fn tick(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }

        let now = self.clock.now();
        self.collect_apply();
        let refreshed = self.collect_refresh(now);

        let today = self.clock.today();
        if self.window_dirty || self.outcome.is_none_or(|outcome| outcome.date() != today) {
            self.recompute_window(today);
        }

        // A lookup that just finished is not restarted in the same tick
        if !refreshed && self.refresh_due(now) {
            self.start_refresh();
        }

        self.evaluate(now);
    }

    /// Stop scheduling work. Idempotent.
    ///
    /// An apply that already finished is kept; one still running keeps
    /// blocking new applies until it returns or times out, but its result
    /// is discarded.
    pub fn pause(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }

        self.collect_apply();
        self.cancel_outstanding();
        self.lifecycle = Lifecycle::Paused;
        log_block_start!("Automation paused");
        self.publish(self.clock.now());
    }

    /// Re-arm scheduling and run a tick immediately. Idempotent.
    pub fn resume(&mut self) {
        if self.lifecycle != Lifecycle::Paused {
            return;
        }

        self.lifecycle = Lifecycle::Running;
        log_block_start!("Automation resumed");
        self.tick();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn toggle(&mut self) {
        match self.lifecycle {
            Lifecycle::Running => self.pause(),
            Lifecycle::Paused => self.resume(),
            Lifecycle::Initializing | Lifecycle::Stopped => {}
        }
    }

    /// Cancel outstanding work and publish the final snapshot.
    pub fn shutdown(&mut self) {
        if self.lifecycle == Lifecycle::Stopped {
            return;
        }

        if self.pending_apply.is_some() {
            log_decorated!("Abandoning theme change still in progress");
        }
        self.cancel_outstanding();
        self.pending_apply = None;
        self.lifecycle = Lifecycle::Stopped;
        self.publish(self.clock.now());
    }

    /// Drive the controller from `messages` until shutdown.
    ///
    /// Ticks every poll interval while running; while paused the loop only
    /// waits for messages. A closed channel is treated as shutdown.
    pub fn run(mut self, messages: Receiver<ControlMessage>) {
        if self.lifecycle == Lifecycle::Initializing {
            self.initialize();
        }

        let poll_interval = self.settings.poll_interval;
        let mut next_tick = Instant::now() + poll_interval;

        loop {
            let message = if self.lifecycle == Lifecycle::Paused {
                match messages.recv() {
                    Ok(message) => Some(message),
                    Err(_) => break,
                }
            } else {
                let wait = next_tick.saturating_duration_since(Instant::now());
                match messages.recv_timeout(wait) {
                    Ok(message) => Some(message),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            };

            match message {
                None | Some(ControlMessage::TickNow) => self.tick(),
                Some(ControlMessage::Toggle) => self.toggle(),
                Some(ControlMessage::SetEnabled(enabled)) => self.set_enabled(enabled),
                Some(ControlMessage::Shutdown) => break,
            }
            next_tick = Instant::now() + poll_interval;
        }

        self.shutdown();
    }

    fn cancel_outstanding(&mut self) {
        self.generation += 1;
        self.pending_refresh = None;
    }

    fn collect_apply(&mut self) {
        let Some((state, task)) = self.pending_apply.take() else {
            return;
        };

        match task.poll() {
            TaskPoll::Pending if task.age() >= self.settings.apply_timeout => {
                // Dropping the task drops its receiver, so a late result is lost
                self.apply_failed(
                    state,
                    &format!(
                        "timed out after {:.1}s",
                        self.settings.apply_timeout.as_secs_f64()
                    ),
                );
            }
            TaskPoll::Pending => self.pending_apply = Some((state, task)),
            TaskPoll::Ready(_) if task.generation() != self.generation => {
                log_decorated!("Discarding theme change started before pause");
            }
            TaskPoll::Ready(result) => self.finish_apply(state, result),
            TaskPoll::Lost => self.apply_failed(state, "theme thread ended unexpectedly"),
        }
    }

    /// Consume a finished background lookup. Returns true when one ended.
    fn collect_refresh(&mut self, now: DateTime<Utc>) -> bool {
        let Some(task) = self.pending_refresh.take() else {
            return false;
        };

        match task.poll() {
            TaskPoll::Ready(_) if task.generation() != self.generation => {}
            TaskPoll::Ready(Ok(fresh)) => self.absorb_position(fresh, now),
            TaskPoll::Ready(Err(e)) => self.location_failed(&e.to_string()),
            TaskPoll::Lost => self.location_failed("lookup thread ended unexpectedly"),
            TaskPoll::Pending if task.age() >= self.settings.location_timeout => {
                self.location_failed(&format!(
                    "no answer within {}s",
                    self.settings.location_timeout.as_secs()
                ));
            }
            TaskPoll::Pending => {
                self.pending_refresh = Some(task);
                return false;
            }
        }
        true
    }

    fn refresh_due(&self, now: DateTime<Utc>) -> bool {
        if self.provider.is_none() || self.pending_refresh.is_some() {
            return false;
        }
        match self.last_location_refresh {
            None => true,
            Some(last) => {
                let interval = chrono::Duration::from_std(self.settings.location_refresh_interval)
                    .unwrap_or_else(|_| chrono::Duration::days(365));
                now - last >= interval
            }
        }
    }

    fn start_refresh(&mut self) {
        let Some(provider) = self.provider.clone() else {
            return;
        };
        let timeout = self.settings.location_timeout;
        match worker::spawn("location-refresh", self.generation, move || {
            provider.fetch(timeout)
        }) {
            Ok(task) => self.pending_refresh = Some(task),
            Err(e) => self.location_failed(&e.to_string()),
        }
    }

    /// Take a fresh sample into the cache when it moved materially.
    fn absorb_position(&mut self, fresh: GeoPosition, now: DateTime<Utc>) {
        self.last_location_refresh = Some(now);
        if self.location_degraded {
            self.location_degraded = false;
            log_info!("Location lookup recovered");
        }

        let material = match &self.position {
            Some(cached) => fresh.differs_materially(cached, self.settings.change_threshold),
            None => true,
        };

        if material {
            if let Err(e) = self.store.save(&fresh) {
                log_warning!("Failed to save location: {e}");
            }
            log_block_start!("Location: {fresh}");
            self.position = Some(fresh);
            self.window_dirty = true;
        }
        self.origin = PositionOrigin::Provider;
    }

    fn location_failed(&mut self, reason: &str) {
        if self.location_degraded {
            return;
        }
        self.location_degraded = true;

        log_warning!("Location lookup failed: {reason}");
        let message = match &self.position {
            Some(position) => format!(
                "Location unavailable, using {}",
                position.display_name()
            ),
            None => "Location unavailable, using the default schedule".to_string(),
        };
        self.notifier.notify(&message, Severity::Info);
    }

    /// Replace the outcome for `today`.
    ///
    /// Falls back to the fixed schedule when no position is known. A
    /// calculator error keeps the previous outcome if there is one.
    fn recompute_window(&mut self, today: NaiveDate) {
        let computed = match &self.position {
            Some(position) => geo::compute(today, position.latitude, position.longitude),
            None => Ok(self.fallback(today)),
        };

        let outcome = match computed {
            Ok(outcome) => outcome,
            Err(e) => {
                log_warning!("Solar calculation failed: {e}");
                if self.outcome.is_some() {
                    self.window_dirty = false;
                    return;
                }
                self.fallback(today)
            }
        };

        if let SolarOutcome::NoTransition { polar, .. } = outcome
            && self.reported_polar != Some(today)
        {
            self.reported_polar = Some(today);
            let state = geo::wanted_state(self.clock.now(), &outcome);
            self.notifier.notify(
                &format!("No sunrise or sunset today ({polar}), staying {state}"),
                Severity::Info,
            );
        }

        if let Some(window) = outcome.window() {
            log_decorated!(
                "Sunrise {} / sunset {} on {}",
                self.clock.to_local(window.sunrise).format("%H:%M"),
                self.clock.to_local(window.sunset).format("%H:%M"),
                today
            );
        }

        self.outcome = Some(outcome);
        self.window_dirty = false;
    }

    fn fallback(&self, today: NaiveDate) -> SolarOutcome {
        geo::fallback_window(
            today,
            self.settings.fallback_sunrise,
            self.settings.fallback_sunset,
            self.clock.as_ref(),
        )
    }

    /// Decide the wanted state, apply it if needed, and publish.
    fn evaluate(&mut self, now: DateTime<Utc>) {
        let wanted = self
            .outcome
            .as_ref()
            .map(|outcome| geo::wanted_state(now, outcome));

        if let Some(wanted) = wanted
            && self.last_applied != Some(wanted)
            && self.pending_apply.is_none()
        {
            self.start_apply(wanted);
        }

        self.publish(now);
    }

    fn start_apply(&mut self, state: DisplayState) {
        let applier = Arc::clone(&self.applier);
        let task = match worker::spawn("theme-apply", self.generation, move || {
            applier.apply(state)
        }) {
            Ok(task) => task,
            Err(e) => {
                self.apply_failed(state, &e.to_string());
                return;
            }
        };

        match task.wait(self.settings.apply_timeout) {
            TaskPoll::Ready(result) => self.finish_apply(state, result),
            TaskPoll::Pending => {
                log_warning!(
                    "Switching to {state} theme is taking longer than {:.1}s",
                    self.settings.apply_timeout.as_secs_f64()
                );
                self.pending_apply = Some((state, task));
            }
            TaskPoll::Lost => self.apply_failed(state, "theme thread ended unexpectedly"),
        }
    }

    fn finish_apply(&mut self, state: DisplayState, result: Result<()>) {
        match result {
            Ok(()) => {
                if self.apply_degraded {
                    self.apply_degraded = false;
                    log_info!("Theme changes working again");
                }
                log_block_start!("Switched to {} theme {}", state, state.symbol());
                self.last_applied = Some(state);
            }
            Err(e) => self.apply_failed(state, &e.to_string()),
        }
    }

    fn apply_failed(&mut self, state: DisplayState, reason: &str) {
        log_error!("Theme change failed: {reason}");
        if self.apply_degraded {
            return;
        }
        self.apply_degraded = true;

        self.notifier.notify(
            &format!("Could not switch to {state} theme: {reason}"),
            Severity::Warning,
        );
    }

    fn snapshot(&self, now: DateTime<Utc>) -> StatusSnapshot {
        let display_state = self
            .outcome
            .as_ref()
            .map(|outcome| geo::wanted_state(now, outcome));
        let next_switch = self
            .outcome
            .as_ref()
            .and_then(|outcome| geo::next_switch(now, outcome));

        StatusSnapshot {
            lifecycle: self.lifecycle,
            display_state,
            applied_state: self.last_applied,
            outcome: self.outcome,
            next_switch,
            position: self.position.clone(),
            position_origin: self.origin,
            updated_at: now,
        }
    }

    fn publish(&mut self, now: DateTime<Utc>) {
        let snapshot = self.snapshot(now);
        for observer in &mut self.observers {
            observer.on_status(&snapshot);
        }
        self.status.publish(snapshot);
    }
}
