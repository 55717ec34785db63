//! Per-venue routing attributes.

use serde::Deserialize;

use crate::domain::Venue;

/// One `[[venues]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    pub name: String,
    pub taker_fee: f64,
    #[serde(default)]
    pub maker_rebate: f64,
    pub p99_latency_ms: u32,
    pub queue_position: f64,
}

impl VenueConfig {
    fn new(name: &str, taker_fee: f64, maker_rebate: f64, p99_latency_ms: u32, queue_position: f64) -> Self {
        Self {
            name: name.to_string(),
            taker_fee,
            maker_rebate,
            p99_latency_ms,
            queue_position,
        }
    }
}

impl From<&VenueConfig> for Venue {
    fn from(config: &VenueConfig) -> Self {
        Venue::new(
            config.name.as_str(),
            config.taker_fee,
            config.maker_rebate,
            config.p99_latency_ms,
            config.queue_position,
        )
    }
}

/// Venue set used when the config lists none.
#[must_use]
pub fn default_venues() -> Vec<VenueConfig> {
    vec![
        VenueConfig::new("BYBIT", 0.0006, 0.0001, 35, 0.70),
        VenueConfig::new("KRAKEN", 0.00026, 0.0, 45, 0.55),
        VenueConfig::new("OKX", 0.0004, 0.00012, 40, 0.65),
    ]
}
