//! Time-related utilities with clock abstraction for testability.
//!
//! All timestamps are Unix epoch milliseconds in UTC.

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use chrono::{TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_timestamp()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Manually driven clock for testing time-dependent behavior.
///
/// Clones share the same underlying time, so a test can hand one copy to the
/// code under test and advance it through another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a new manual clock starting at the given timestamp
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    /// Move the clock forward by `millis`
    pub fn advance_millis(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Move the clock forward by whole seconds
    pub fn advance_secs(&self, secs: i64) {
        self.advance_millis(secs * 1000);
    }

    /// Jump to an absolute timestamp
    pub fn set_millis(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn get_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to RFC 3339 format in UTC.
///
/// Out-of-range timestamps are rendered as the raw millisecond value.
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.to_rfc3339(),
        None => timestamp_millis.to_string(),
    }
}

/// Convert Unix timestamp (milliseconds) to a short `HH:MM:SS` wall-clock label.
pub fn timestamp_to_time_label(timestamp_millis: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}
