use chrono::{DateTime, Utc};
use odelia_engine::Clock;

/// Wall clock from `Date.now()`; the system clock isn't reachable on wasm32.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
}
