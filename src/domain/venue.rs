//! Routing-relevant venue attributes.

use serde::{Deserialize, Serialize};

use super::id::VenueId;

/// A venue as the router sees it.
///
/// Refreshed externally; this crate only scores venue profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: VenueId,
    /// Taker fee as a fraction of notional.
    pub taker_fee: f64,
    /// Maker rebate as a fraction of notional.
    #[serde(default)]
    pub maker_rebate: f64,
    pub p99_latency_ms: u32,
    /// Queue position quality in `[0, 1]`, larger is better.
    pub queue_position: f64,
}

impl Venue {
    #[must_use]
    pub fn new(
        name: impl Into<VenueId>,
        taker_fee: f64,
        maker_rebate: f64,
        p99_latency_ms: u32,
        queue_position: f64,
    ) -> Self {
        Self {
            name: name.into(),
            taker_fee,
            maker_rebate,
            p99_latency_ms,
            queue_position,
        }
    }

    /// Net fee paid per unit notional.
    #[must_use]
    pub fn net_fee(&self) -> f64 {
        self.taker_fee - self.maker_rebate
    }
}
