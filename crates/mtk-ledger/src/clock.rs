//! Time sources for cooldown checks and event timestamps.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Source of the current time as seen by the ledger.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in unix seconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// pass another to the ledger.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    secs: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            secs: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Set the current time.
    pub fn set(&self, now: Timestamp) {
        self.secs.store(now, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: u64) {
        // fetch_update never fails when the closure always returns Some.
        let _ = self
            .secs
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(secs))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.secs.load(Ordering::SeqCst)
    }
}
