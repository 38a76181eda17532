use std::sync::Mutex;

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Wall-clock time source. Injected wherever a timestamp is recorded.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the host's system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Clock pinned to the given unix timestamp in milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        Self::new(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance_millis(&self, millis: i64) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += Duration::milliseconds(millis);
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|g| *g).unwrap_or_default()
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2026-02-14T18:30:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_timestamp_uses_millis_and_z() {
        let clock = FixedClock::from_millis(1_771_093_800_000);
        assert_eq!(iso_timestamp(clock.now()), "2026-02-14T18:30:00.000Z");
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::from_millis(0);
        clock.advance_millis(1500);
        assert_eq!(clock.now().timestamp_millis(), 1500);
    }
}
