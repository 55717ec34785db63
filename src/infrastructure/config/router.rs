//! Venue scoring weights and the routing latency cap.

use serde::Deserialize;

use crate::application::router::RouterWeights;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RouterConfig {
    #[serde(default = "default_baseline_ms")]
    pub baseline_ms: f64,
    #[serde(default = "default_latency_weight")]
    pub latency_weight: f64,
    #[serde(default = "default_queue_weight")]
    pub queue_weight: f64,
    /// Venues slower than this at p99 are never routed to.
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u32,
}

const fn default_baseline_ms() -> f64 {
    25.0
}

const fn default_latency_weight() -> f64 {
    1.0
}

const fn default_queue_weight() -> f64 {
    0.05
}

const fn default_max_latency_ms() -> u32 {
    50
}

impl RouterConfig {
    #[must_use]
    pub const fn weights(&self) -> RouterWeights {
        RouterWeights {
            baseline_ms: self.baseline_ms,
            latency_weight: self.latency_weight,
            queue_weight: self.queue_weight,
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            baseline_ms: default_baseline_ms(),
            latency_weight: default_latency_weight(),
            queue_weight: default_queue_weight(),
            max_latency_ms: default_max_latency_ms(),
        }
    }
}
