//! Time source abstraction for real and manually driven clocks.
//!
//! The controller never reads the system clock directly. It asks a
//! `TimeSource` for the current instant and for the local UTC offset, which
//! lets tests pin both the instant and the time zone without touching the
//! host environment.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

/// Trait for abstracting time operations.
pub trait TimeSource: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Local UTC offset in effect at `instant`.
    fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset;

    /// Current instant in local time.
    fn local_now(&self) -> DateTime<FixedOffset> {
        let now = self.now();
        now.with_timezone(&self.offset_at(now))
    }

    /// Local calendar date.
    fn today(&self) -> NaiveDate {
        self.local_now().date_naive()
    }

    /// Resolve a local wall-clock time to an instant.
    ///
    /// Returns `None` when the wall-clock time does not exist locally.
    fn local_to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.offset_at(self.now())
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Render `instant` in local time.
    fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset_at(instant))
    }
}

/// Real-time implementation backed by the system clock and time zone.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        Local.offset_from_utc_datetime(&instant.naive_utc()).fix()
    }

    fn local_to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        // Ambiguous times (DST fall-back) resolve to the first occurrence
        Local
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Settable clock with a fixed UTC offset.
#[cfg(any(test, feature = "testing-support"))]
pub struct ManualTimeSource {
    current: std::sync::Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

#[cfg(any(test, feature = "testing-support"))]
impl ManualTimeSource {
    pub fn new(start: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            current: std::sync::Mutex::new(start),
            offset,
        }
    }

    /// Clock in UTC.
    pub fn utc(start: DateTime<Utc>) -> Self {
        Self::new(start, Utc.fix())
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.lock() = instant;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.lock();
        *current += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(any(test, feature = "testing-support"))]
impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }

    fn offset_at(&self, _instant: DateTime<Utc>) -> FixedOffset {
        self.offset
    }
}
