//! Time source for every timeout in the engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, NaiveDateTime};

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock that only moves when told to. Clones share the same time, so a
/// test can keep a handle while the engine owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.and_utc().timestamp_millis())),
        }
    }

    pub fn set(&self, time: NaiveDateTime) {
        self.millis
            .store(time.and_utc().timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
            .map(|dt| dt.naive_utc())
            .unwrap_or_default()
    }
}

/// Whole seconds as a `Duration`, saturating at `Duration::MAX` instead of
/// panicking on values chrono cannot represent.
pub fn saturating_seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}
