//! Idempotency store settings.

use std::time::Duration;

use serde::Deserialize;

use crate::adapter::outbound::idempotency::DEFAULT_MAX_ENTRIES;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdempotencyConfig {
    /// How long a seen key stays marked.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Live records kept before the oldest are evicted.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_gc_interval_secs")]
    pub gc_interval_secs: u64,
}

const fn default_ttl_secs() -> u64 {
    86_400
}

const fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

const fn default_gc_interval_secs() -> u64 {
    300
}

impl IdempotencyConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    #[must_use]
    pub const fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.gc_interval_secs)
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
            gc_interval_secs: default_gc_interval_secs(),
        }
    }
}
