//! Reconciliation schedule.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Bound on each venue call: open-order polls and order creation.
    #[serde(default = "default_venue_timeout_ms")]
    pub venue_timeout_ms: u64,
}

const fn default_interval_secs() -> u64 {
    30
}

const fn default_venue_timeout_ms() -> u64 {
    2_000
}

impl ReconcileConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn venue_timeout(&self) -> Duration {
        Duration::from_millis(self.venue_timeout_ms)
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            venue_timeout_ms: default_venue_timeout_ms(),
        }
    }
}
