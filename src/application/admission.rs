//! Intent admission: from a trade decision to a submitted order.
//!
//! ```text
//! ClockGuard ─► IdempotencyKeyer ─► SafetyGate ─► VenueRouter ─► Oms::submit
//! ```
//!
//! Each stage may turn the intent away with an [`AdmissionRejection`]. Those
//! are expected outcomes and come back in `Ok`; only hard failures are `Err`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::idempotency::{deterministic_key, IdempotencyKeyer};
use super::oms::{Oms, OrderIntent};
use super::router::VenueRouter;
use super::safety::SafetyGate;
use crate::domain::{ClientKey, ClockGuard, Decision, Freshness, Order, Portfolio, Side, Verdict, VetoReason};
use crate::error::Result;

/// A trade intent with the decision that produced it.
#[derive(Debug, Clone)]
pub struct AdmissionRequest {
    pub symbol: String,
    pub side: Side,
    pub qty: Decimal,
    pub px: Decimal,
    pub tick_size: Decimal,
    /// When the decision layer formed the intent, epoch milliseconds.
    pub intent_ts_ms: i64,
    /// Market event that triggered the intent, epoch seconds.
    pub event_ts: f64,
    /// When the event was ingested, epoch seconds.
    pub ingest_ts: f64,
    pub decision: Decision,
    /// Overrides the deterministic key, e.g. a random key for manual retries.
    pub client_key: Option<ClientKey>,
}

impl AdmissionRequest {
    /// Key under which this intent is deduplicated.
    #[must_use]
    pub fn client_key(&self) -> ClientKey {
        self.client_key.clone().unwrap_or_else(|| {
            deterministic_key(&self.symbol, self.side, self.qty, self.px, self.intent_ts_ms)
        })
    }
}

/// Why an intent was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionRejection {
    Stale,
    Skewed,
    Duplicate,
    Vetoed(VetoReason),
    NoEligibleVenue,
}

impl fmt::Display for AdmissionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale => f.write_str("Stale"),
            Self::Skewed => f.write_str("Skewed"),
            Self::Duplicate => f.write_str("Duplicate"),
            Self::Vetoed(reason) => write!(f, "Vetoed({reason})"),
            Self::NoEligibleVenue => f.write_str("NoEligibleVenue"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AdmissionOutcome {
    Admitted(Order),
    Rejected(AdmissionRejection),
}

impl AdmissionOutcome {
    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        match self {
            Self::Admitted(order) => Some(order),
            Self::Rejected(_) => None,
        }
    }

    #[must_use]
    pub const fn rejection(&self) -> Option<AdmissionRejection> {
        match self {
            Self::Rejected(r) => Some(*r),
            Self::Admitted(_) => None,
        }
    }
}

/// The admission pipeline.
pub struct Admission {
    clock: ClockGuard,
    keyer: IdempotencyKeyer,
    gate: SafetyGate,
    router: VenueRouter,
    max_latency_ms: u32,
    oms: Arc<Oms>,
}

impl Admission {
    #[must_use]
    pub fn new(
        clock: ClockGuard,
        keyer: IdempotencyKeyer,
        gate: SafetyGate,
        router: VenueRouter,
        max_latency_ms: u32,
        oms: Arc<Oms>,
    ) -> Self {
        Self {
            clock,
            keyer,
            gate,
            router,
            max_latency_ms,
            oms,
        }
    }

    #[must_use]
    pub fn oms(&self) -> &Arc<Oms> {
        &self.oms
    }

    /// Run `request` through every stage and submit it if all pass.
    ///
    /// The key is marked seen before the safety gate runs, so a vetoed
    /// intent resubmitted unchanged is reported as a duplicate.
    ///
    /// # Errors
    ///
    /// Store failures, invariant violations, and venue failures at create.
    pub async fn admit(
        &self,
        request: AdmissionRequest,
        portfolio: &Portfolio,
        now: DateTime<Utc>,
    ) -> Result<AdmissionOutcome> {
        let now_ms = now.timestamp_millis();
        #[allow(clippy::cast_precision_loss)]
        let now_ts = now_ms as f64 / 1000.0;

        match self.clock.check(request.event_ts, request.ingest_ts, now_ts) {
            Freshness::Fresh => {}
            Freshness::Skewed => return Ok(reject(&request, AdmissionRejection::Skewed)),
            Freshness::Stale => return Ok(reject(&request, AdmissionRejection::Stale)),
        }

        let client_key = request.client_key();
        if self.keyer.seen(&client_key).await? {
            return Ok(reject(&request, AdmissionRejection::Duplicate));
        }

        let approval = match self.gate.evaluate(request.decision.clone(), portfolio, now_ms) {
            Verdict::Approved(approval) => approval,
            Verdict::Vetoed(vetoed) => {
                info!(
                    client_key = %client_key,
                    reason = %vetoed.reason(),
                    "Decision vetoed"
                );
                return Ok(reject(&request, AdmissionRejection::Vetoed(vetoed.reason())));
            }
        };

        let venues = self.oms.venues().reachable_profiles();
        let venue = match self.router.pick_best(&venues, self.max_latency_ms) {
            Ok(venue) => venue.name.clone(),
            Err(e) => {
                info!(client_key = %client_key, error = %e, "No venue to route to");
                return Ok(reject(&request, AdmissionRejection::NoEligibleVenue));
            }
        };

        let intent = OrderIntent {
            client_key,
            symbol: request.symbol,
            side: request.side,
            qty: request.qty,
            px: request.px,
            tick_size: request.tick_size,
        };
        let order = self.oms.submit(intent, approval, &venue).await?;
        Ok(AdmissionOutcome::Admitted(order))
    }
}

fn reject(request: &AdmissionRequest, rejection: AdmissionRejection) -> AdmissionOutcome {
    debug!(symbol = %request.symbol, side = %request.side, rejection = %rejection, "Intent rejected");
    AdmissionOutcome::Rejected(rejection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::idempotency::MemoryIdempotencyStore;
    use crate::adapter::outbound::memory::MemoryLedger;
    use crate::adapter::outbound::paper::PaperVenue;
    use crate::application::registry::VenueRegistry;
    use crate::domain::{OrderStatus, Venue};
    use crate::port::VenueAdapter;
    use rust_decimal_macros::dec;

    fn admission(p99_latency_ms: u32) -> Admission {
        let mut registry = VenueRegistry::new();
        registry.register(
            Venue::new("paper", 0.0005, 0.0, p99_latency_ms, 0.6),
            Arc::new(PaperVenue::new("paper")) as Arc<dyn VenueAdapter>,
        );
        let oms = Arc::new(Oms::new(Arc::new(MemoryLedger::new()), Arc::new(registry)));
        Admission::new(
            ClockGuard::default(),
            IdempotencyKeyer::new(Arc::new(MemoryIdempotencyStore::default())),
            SafetyGate::default(),
            VenueRouter::default(),
            50,
            oms,
        )
    }

    fn request(now: DateTime<Utc>) -> AdmissionRequest {
        let ts = now.timestamp_millis() as f64 / 1000.0;
        AdmissionRequest {
            symbol: "BTCUSDT".into(),
            side: Side::Buy,
            qty: dec!(0.01),
            px: dec!(30000),
            tick_size: dec!(0.1),
            intent_ts_ms: now.timestamp_millis(),
            event_ts: ts - 0.01,
            ingest_ts: ts,
            decision: Decision::new(dec!(0.001), dec!(300), 0),
            client_key: None,
        }
    }

    fn portfolio() -> Portfolio {
        Portfolio::flat(dec!(100000))
    }

    #[tokio::test]
    async fn fresh_safe_intent_is_admitted_once() {
        let admission = admission(30);
        let now = Utc::now();

        let first = admission.admit(request(now), &portfolio(), now).await.unwrap();
        let order = first.order().unwrap();
        assert_eq!(order.status(), OrderStatus::Ack);
        assert_eq!(order.venue().as_str(), "paper");
        assert!(order.client_key().as_str().starts_with("ANGEL:BTCUSDT:BUY:"));

        let second = admission.admit(request(now), &portfolio(), now).await.unwrap();
        assert_eq!(second.rejection(), Some(AdmissionRejection::Duplicate));
    }

    #[tokio::test]
    async fn stale_event_never_reaches_the_keyer() {
        let admission = admission(30);
        let now = Utc::now();
        let mut stale = request(now);
        stale.event_ts -= 5.0;
        stale.ingest_ts = stale.event_ts;

        let outcome = admission.admit(stale, &portfolio(), now).await.unwrap();
        assert_eq!(outcome.rejection(), Some(AdmissionRejection::Stale));
        let retry = admission.admit(request(now), &portfolio(), now).await.unwrap();
        assert!(retry.order().is_some());
    }

    #[tokio::test]
    async fn veto_is_reported_with_reason() {
        let admission = admission(30);
        let now = Utc::now();
        let mut risky = request(now);
        risky.decision = Decision::new(dec!(0.5), dec!(300), 0);

        let outcome = admission.admit(risky, &portfolio(), now).await.unwrap();
        assert_eq!(
            outcome.rejection(),
            Some(AdmissionRejection::Vetoed(VetoReason::PerTradeRiskExceeded))
        );
    }

    #[tokio::test]
    async fn slow_venues_leave_nothing_to_route_to() {
        let admission = admission(80);
        let now = Utc::now();
        let outcome = admission.admit(request(now), &portfolio(), now).await.unwrap();
        assert_eq!(outcome.rejection(), Some(AdmissionRejection::NoEligibleVenue));
    }
}
