//! Event freshness limits.

use serde::Deserialize;

use crate::domain::ClockGuard;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ClockConfig {
    /// Max gap between an event's timestamp and its ingest time.
    #[serde(default = "default_max_skew_ms")]
    pub max_skew_ms: u64,
    /// Max age of an event at admission.
    #[serde(default = "default_max_age_ms")]
    pub max_age_ms: u64,
}

const fn default_max_skew_ms() -> u64 {
    100
}

const fn default_max_age_ms() -> u64 {
    500
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_skew_ms: default_max_skew_ms(),
            max_age_ms: default_max_age_ms(),
        }
    }
}

impl From<&ClockConfig> for ClockGuard {
    fn from(config: &ClockConfig) -> Self {
        Self::new(config.max_skew_ms, config.max_age_ms)
    }
}
