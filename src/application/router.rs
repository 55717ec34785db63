//! Venue selection by cost and latency.

use crate::domain::Venue;
use crate::error::RoutingError;

/// Tunable scoring constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterWeights {
    /// Latency below this many milliseconds costs nothing.
    pub baseline_ms: f64,
    /// Penalty per second of p99 latency above the baseline.
    pub latency_weight: f64,
    /// Penalty for a fully unfavourable queue position.
    pub queue_weight: f64,
}

impl Default for RouterWeights {
    fn default() -> Self {
        Self {
            baseline_ms: 25.0,
            latency_weight: 1.0,
            queue_weight: 0.05,
        }
    }
}

/// Scores and ranks venues. Lower scores are better.
#[derive(Debug, Clone, Copy, Default)]
pub struct VenueRouter {
    weights: RouterWeights,
}

impl VenueRouter {
    #[must_use]
    pub const fn new(weights: RouterWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub const fn weights(&self) -> &RouterWeights {
        &self.weights
    }

    /// Net fee, plus latency above baseline, plus queue position penalty.
    #[must_use]
    pub fn score(&self, venue: &Venue) -> f64 {
        let w = &self.weights;
        let excess_latency_s = ((f64::from(venue.p99_latency_ms) - w.baseline_ms) / 1000.0).max(0.0);
        venue.net_fee()
            + excess_latency_s * w.latency_weight
            + (1.0 - venue.queue_position) * w.queue_weight
    }

    /// Eligible venues with their scores, best first.
    ///
    /// The sort is stable, so equal scores keep input order.
    #[must_use]
    pub fn rank<'a>(&self, venues: &'a [Venue], max_latency_ms: u32) -> Vec<(&'a Venue, f64)> {
        let mut ranked: Vec<_> = venues
            .iter()
            .filter(|v| v.p99_latency_ms <= max_latency_ms)
            .map(|v| (v, self.score(v)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked
    }

    /// Lowest-scoring venue within `max_latency_ms`; first wins ties.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::NoEligibleVenue`] if no venue meets the cap.
    pub fn pick_best<'a>(
        &self,
        venues: &'a [Venue],
        max_latency_ms: u32,
    ) -> Result<&'a Venue, RoutingError> {
        let mut best: Option<(&Venue, f64)> = None;
        for venue in venues.iter().filter(|v| v.p99_latency_ms <= max_latency_ms) {
            let score = self.score(venue);
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((venue, score));
            }
        }
        best.map(|(v, _)| v)
            .ok_or(RoutingError::NoEligibleVenue { max_latency_ms })
    }
}
