//! Order lifecycle types and the order state machine.
//!
//! ```text
//! NEW ──► ACK ──► PARTIAL ──► FILLED
//!  │       │        │
//!  │       └────────┴──────► CANCELLED
//!  ├───────────────────────► CANCELLED
//!  └───────────────────────► REJECT
//! ```
//!
//! Fills may arrive before a separate acknowledgement, so `NEW` may also move
//! straight to `PARTIAL` or `FILLED`. Terminal orders are retained for audit
//! and never leave their terminal state.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ClientKey, OrderId, VenueId, VenueOrderId};
use crate::error::OrderError;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Created locally by the OMS, not yet confirmed by the venue.
    New,
    /// Venue confirmed receipt.
    Ack,
    /// Some quantity filled.
    Partial,
    Filled,
    Cancelled,
    /// Venue rejected the order.
    Reject,
}

impl OrderStatus {
    /// Returns `true` if no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Reject)
    }

    /// Returns `true` while the order may still rest at a venue.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !self.is_terminal()
    }

    /// Whether the state machine permits moving from `self` to `to`.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        use OrderStatus::{Ack, Cancelled, Filled, New, Partial, Reject};
        matches!(
            (self, to),
            (New, Ack | Partial | Filled | Cancelled | Reject)
                | (Ack, Partial | Filled | Cancelled)
                | (Partial, Partial | Filled | Cancelled)
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Ack => "ACK",
            Self::Partial => "PARTIAL",
            Self::Filled => "FILLED",
            Self::Cancelled => "CANCELLED",
            Self::Reject => "REJECT",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an order was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// The ledger believed the order open but the venue had no record of it.
    VenueMissing,
    /// The venue reported the order cancelled.
    Venue,
    /// Cancelled on request through the OMS.
    Requested,
}

impl CancelReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VenueMissing => "VenueMissing",
            Self::Venue => "Venue",
            Self::Requested => "Requested",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to create an order, minus the ledger-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub client_key: ClientKey,
    pub venue: VenueId,
    pub symbol: String,
    pub side: Side,
    pub qty: Decimal,
    pub px: Decimal,
    pub tick_size: Decimal,
}

/// A single trading intent routed to one venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    order_id: OrderId,
    venue_order_id: Option<VenueOrderId>,
    client_key: ClientKey,
    venue: VenueId,
    symbol: String,
    side: Side,
    qty: Decimal,
    px: Decimal,
    tick_size: Decimal,
    filled_qty: Decimal,
    status: OrderStatus,
    terminal_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Create an order in `NEW` from a ledger-assigned id.
    #[must_use]
    pub fn new(order_id: OrderId, new: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            order_id,
            venue_order_id: None,
            client_key: new.client_key,
            venue: new.venue,
            symbol: new.symbol,
            side: new.side,
            qty: new.qty,
            px: new.px,
            tick_size: new.tick_size,
            filled_qty: Decimal::ZERO,
            status: OrderStatus::New,
            terminal_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn order_id(&self) -> OrderId {
        self.order_id
    }

    #[must_use]
    pub const fn venue_order_id(&self) -> Option<&VenueOrderId> {
        self.venue_order_id.as_ref()
    }

    #[must_use]
    pub const fn client_key(&self) -> &ClientKey {
        &self.client_key
    }

    #[must_use]
    pub const fn venue(&self) -> &VenueId {
        &self.venue
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub const fn qty(&self) -> Decimal {
        self.qty
    }

    #[must_use]
    pub const fn px(&self) -> Decimal {
        self.px
    }

    #[must_use]
    pub const fn tick_size(&self) -> Decimal {
        self.tick_size
    }

    #[must_use]
    pub const fn filled_qty(&self) -> Decimal {
        self.filled_qty
    }

    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Cancel or reject reason, once terminal.
    #[must_use]
    pub fn terminal_reason(&self) -> Option<&str> {
        self.terminal_reason.as_deref()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Notional value of the order (`qty * px`).
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.qty * self.px
    }

    /// True when `px` differs from the order's price by more than one tick.
    #[must_use]
    pub fn price_drifted(&self, px: Decimal) -> bool {
        (px - self.px).abs() > self.tick_size
    }

    /// Move to `to`, enforcing the state machine.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] when the move is not allowed,
    /// including any move out of a terminal state.
    pub fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition {
                order_id: self.order_id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.touch();
        Ok(())
    }

    /// Advance `NEW` to `ACK`, recording the venue-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] unless the order is `NEW`.
    pub fn acknowledge(&mut self, venue_order_id: VenueOrderId) -> Result<(), OrderError> {
        self.transition(OrderStatus::Ack)?;
        self.venue_order_id = Some(venue_order_id);
        Ok(())
    }

    /// Terminalize as `CANCELLED` with a reason.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] if the order is already terminal.
    pub fn cancel(&mut self, reason: CancelReason) -> Result<(), OrderError> {
        self.transition(OrderStatus::Cancelled)?;
        self.terminal_reason = Some(reason.to_string());
        Ok(())
    }

    /// Terminalize as `REJECT` with the venue's reason.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] unless the order is `NEW`.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        self.transition(OrderStatus::Reject)?;
        self.terminal_reason = Some(reason.into());
        Ok(())
    }

    /// Record cumulative filled quantity; `FILLED` once it reaches `qty`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] if the order is terminal.
    pub fn record_fill(&mut self, filled_qty: Decimal) -> Result<(), OrderError> {
        let to = if filled_qty >= self.qty {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
        self.transition(to)?;
        self.filled_qty = filled_qty.min(self.qty);
        Ok(())
    }

    /// Replace desired terms while the order is still open.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] if the order is terminal.
    pub fn amend(&mut self, px: Decimal, qty: Decimal) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::InvalidTransition {
                order_id: self.order_id,
                from: self.status,
                to: self.status,
            });
        }
        self.px = px;
        self.qty = qty;
        self.touch();
        Ok(())
    }

    /// Point the order at a new venue-side id after a venue replace.
    pub fn set_venue_order_id(&mut self, venue_order_id: VenueOrderId) {
        self.venue_order_id = Some(venue_order_id);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order() -> Order {
        Order::new(
            OrderId::new(1),
            NewOrder {
                client_key: ClientKey::from("ANGEL:test"),
                venue: VenueId::from("binance"),
                symbol: "BTCUSDT".into(),
                side: Side::Buy,
                qty: dec!(1),
                px: dec!(100),
                tick_size: dec!(0.01),
            },
        )
    }

    #[test]
    fn new_order_starts_new_without_venue_id() {
        let o = order();
        assert_eq!(o.status(), OrderStatus::New);
        assert!(o.venue_order_id().is_none());
        assert_eq!(o.notional(), dec!(100));
    }

    #[test]
    fn happy_path_to_filled() {
        let mut o = order();
        o.acknowledge(VenueOrderId::from("v-1")).unwrap();
        o.record_fill(dec!(0.4)).unwrap();
        assert_eq!(o.status(), OrderStatus::Partial);
        o.record_fill(dec!(1)).unwrap();
        assert_eq!(o.status(), OrderStatus::Filled);
        assert_eq!(o.filled_qty(), dec!(1));
    }

    #[test]
    fn terminal_states_reject_every_transition() {
        let all = [
            OrderStatus::New,
            OrderStatus::Ack,
            OrderStatus::Partial,
            OrderStatus::Filled,
            OrderStatus::Cancelled,
            OrderStatus::Reject,
        ];
        for from in [OrderStatus::Filled, OrderStatus::Cancelled, OrderStatus::Reject] {
            for to in all {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn reject_only_from_new() {
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Reject));
        assert!(!OrderStatus::Ack.can_transition_to(OrderStatus::Reject));
        assert!(!OrderStatus::Partial.can_transition_to(OrderStatus::Reject));
    }

    #[test]
    fn ack_twice_is_invalid() {
        let mut o = order();
        o.acknowledge(VenueOrderId::from("v-1")).unwrap();
        let err = o.acknowledge(VenueOrderId::from("v-2")).unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { .. }));
        assert_eq!(o.venue_order_id().unwrap().as_str(), "v-1");
    }

    #[test]
    fn cancel_after_fill_is_invalid() {
        let mut o = order();
        o.record_fill(dec!(1)).unwrap();
        let err = o.cancel(CancelReason::Requested).unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidTransition {
                order_id: OrderId::new(1),
                from: OrderStatus::Filled,
                to: OrderStatus::Cancelled,
            }
        );
    }

    #[test]
    fn cancel_records_reason() {
        let mut o = order();
        o.cancel(CancelReason::VenueMissing).unwrap();
        assert_eq!(o.terminal_reason(), Some("VenueMissing"));
    }

    #[test]
    fn price_drift_is_measured_in_ticks() {
        let o = order();
        assert!(!o.price_drifted(dec!(100.01)));
        assert!(o.price_drifted(dec!(100.02)));
        assert!(o.price_drifted(dec!(99.98)));
    }

    #[test]
    fn amend_refused_once_terminal() {
        let mut o = order();
        o.amend(dec!(101), dec!(2)).unwrap();
        assert_eq!(o.px(), dec!(101));
        o.cancel(CancelReason::Requested).unwrap();
        assert!(o.amend(dec!(102), dec!(2)).is_err());
    }
}
