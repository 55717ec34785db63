//! Venue-agnostic domain types: orders, decisions, portfolio, venues, clocks.

pub mod clock;
pub mod decision;
pub mod id;
pub mod order;
pub mod portfolio;
pub mod venue;

pub use clock::{is_stale, within_skew, ClockGuard, Freshness};
pub use decision::{ApprovedDecision, Decision, Verdict, VetoReason, VetoedDecision};
pub use id::{ClientKey, OrderId, VenueId, VenueOrderId};
pub use order::{CancelReason, NewOrder, Order, OrderStatus, Side};
pub use portfolio::Portfolio;
pub use venue::Venue;
