//! Observability and time ports for the rate cache.

use chrono::{DateTime, Utc};

use crate::domain::RateEvent;

/// Receives refresh outcomes, including swallowed persistence failures.
pub trait EventSink: Send + Sync + 'static {
    fn emit(&self, event: RateEvent);
}

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
