//! Document id generation.
//!
//! Ids are decimal millisecond timestamps taken from a [`Clock`]. Two inserts
//! landing in the same millisecond would collide on a bare timestamp, so
//! [`DocumentIdGenerator`] bumps each id to at least one past the previous
//! one. Ids handed out by a single generator are therefore unique and
//! strictly increasing, while still reading as "time of insertion".
//!
//! ```
//! use std::sync::Arc;
//! use mindcare_store::id_generator::{DocumentIdGenerator, FixedClock};
//!
//! let ids = DocumentIdGenerator::new(Arc::new(FixedClock::new(1_700_000_000_000)));
//! assert_eq!(ids.next_id(), "1700000000000");
//! assert_eq!(ids.next_id(), "1700000000001");
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// A time provider for ids, dates and timestamps written into documents.
pub trait Clock: Send + Sync + Debug {
    /// Current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// Current time as a UTC date-time.
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis() as i64).unwrap_or_default()
    }
}

/// Wall clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually driven clock. Time only moves through [`FixedClock::advance`]
/// or [`FixedClock::set`].
#[derive(Debug, Default)]
pub struct FixedClock {
    millis: AtomicU64,
}

impl FixedClock {
    pub fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Hands out unique, increasing timestamp ids.
#[derive(Debug)]
pub struct DocumentIdGenerator {
    clock: Arc<dyn Clock>,
    last: AtomicU64,
}

impl DocumentIdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicU64::new(0),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Next id as a number. Never returns the same value twice.
    pub fn next_raw(&self) -> u64 {
        let now = self.clock.now_millis();
        let mut last = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return candidate,
                Err(current) => last = current,
            }
        }
    }

    pub fn next_id(&self) -> String {
        self.next_raw().to_string()
    }
}
