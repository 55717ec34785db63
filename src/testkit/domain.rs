//! Builders for domain primitives used across tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{
    ClientKey, Decision, NewOrder, OrderStatus, Portfolio, Side, Venue, VenueId, VenueOrderId,
};
use crate::port::RemoteOrder;

/// A 1 @ 100 buy of `BTCUSDT` with a 0.01 tick.
pub fn new_order(client_key: &str, venue: &str) -> NewOrder {
    NewOrder {
        client_key: ClientKey::from(client_key),
        venue: VenueId::from(venue),
        symbol: "BTCUSDT".into(),
        side: Side::Buy,
        qty: dec!(1),
        px: dec!(100),
        tick_size: dec!(0.01),
    }
}

/// The venue-side copy of [`new_order`] with the given status.
pub fn remote_order(client_key: &str, venue_order_id: &str, status: OrderStatus) -> RemoteOrder {
    RemoteOrder {
        client_key: ClientKey::from(client_key),
        venue_order_id: VenueOrderId::from(venue_order_id),
        status,
        px: dec!(100),
        qty: dec!(1),
    }
}

/// A decision well inside default risk limits.
pub fn safe_decision() -> Decision {
    Decision::new(dec!(0.001), dec!(100), 0)
}

pub fn decision(risk_size_nav: Decimal, notional_estimate: Decimal, clock_skew_ms: i64) -> Decision {
    Decision::new(risk_size_nav, notional_estimate, clock_skew_ms)
}

/// Flat book with `nav` and no losses.
pub fn portfolio(nav: Decimal) -> Portfolio {
    Portfolio::flat(nav)
}

/// The three reference venues: BYBIT, KRAKEN, OKX.
pub fn reference_venues() -> Vec<Venue> {
    vec![
        Venue::new("BYBIT", 0.0006, 0.0001, 35, 0.70),
        Venue::new("KRAKEN", 0.00026, 0.0, 45, 0.55),
        Venue::new("OKX", 0.0004, 0.00012, 40, 0.65),
    ]
}

/// A venue profile fast enough for any default latency cap.
pub fn fast_venue(name: &str) -> Venue {
    Venue::new(name, 0.0005, 0.0, 20, 0.6)
}
