//! Event timestamp validation.
//!
//! Timestamps are epoch seconds as `f64`; limits are milliseconds. Callers
//! supply a monotonically non-decreasing `now`/`ingest` source.

use serde::{Deserialize, Serialize};

/// True iff the event and ingest clocks are within `max_skew_ms` of each other.
#[must_use]
pub fn within_skew(event_ts: f64, ingest_ts: f64, max_skew_ms: u64) -> bool {
    ((ingest_ts - event_ts) * 1000.0).abs() <= max_skew_ms as f64
}

/// True iff the event is older than `max_age_ms` at `now_ts`.
#[must_use]
pub fn is_stale(event_ts: f64, now_ts: f64, max_age_ms: u64) -> bool {
    (now_ts - event_ts) * 1000.0 > max_age_ms as f64
}

/// Freshness classification of an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Freshness {
    Fresh,
    /// Event and ingest clocks disagree beyond the skew limit.
    Skewed,
    /// Event is older than the age limit.
    Stale,
}

/// Freshness limits applied on the admission path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockGuard {
    max_skew_ms: u64,
    max_age_ms: u64,
}

impl Default for ClockGuard {
    fn default() -> Self {
        Self::new(100, 500)
    }
}

impl ClockGuard {
    #[must_use]
    pub const fn new(max_skew_ms: u64, max_age_ms: u64) -> Self {
        Self {
            max_skew_ms,
            max_age_ms,
        }
    }

    /// Classify an event. Skew is checked before age.
    #[must_use]
    pub fn check(&self, event_ts: f64, ingest_ts: f64, now_ts: f64) -> Freshness {
        if !within_skew(event_ts, ingest_ts, self.max_skew_ms) {
            Freshness::Skewed
        } else if is_stale(event_ts, now_ts, self.max_age_ms) {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }

    #[must_use]
    pub const fn max_skew_ms(&self) -> u64 {
        self.max_skew_ms
    }

    #[must_use]
    pub const fn max_age_ms(&self) -> u64 {
        self.max_age_ms
    }
}
