//! Evaluation clock
//!
//! Accrual is always computed against an explicit instant. Components that
//! want "now" take a [`Clock`] instead of reading the wall clock themselves,
//! so tests and simulations can pin or step time.

use crate::types::TimestampMs;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of the evaluation instant
pub trait Clock: Send + Sync {
    /// Current time in Unix milliseconds
    fn now_ms(&self) -> TimestampMs;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock
///
/// Clones share the same instant.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<Mutex<TimestampMs>>,
}

impl ManualClock {
    /// Create a clock pinned at `now_ms`
    pub fn new(now_ms: TimestampMs) -> Self {
        Self {
            now: Arc::new(Mutex::new(now_ms)),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, now_ms: TimestampMs) {
        *self.now.lock() = now_ms;
    }

    /// Move forward by `delta_ms` and return the new instant
    pub fn advance(&self, delta_ms: i64) -> TimestampMs {
        let mut now = self.now.lock();
        *now = now.saturating_add(delta_ms);
        *now
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        *self.now.lock()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> TimestampMs {
        (**self).now_ms()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> TimestampMs {
        (**self).now_ms()
    }
}
