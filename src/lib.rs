//! Ordergate - order management and risk-control plane.
//!
//! Sits between a trading decision layer and a set of execution venues.
//! Decisions pass freshness and idempotency checks and a pre-commit safety
//! gate, are routed to the cheapest venue within a latency cap, and become
//! orders tracked by a strict state machine. A reconciler keeps the ledger
//! and the venues in agreement.
//!
//! # Architecture
//!
//! - [`domain`] - Orders, decisions, verdicts, venues, clock checks
//! - [`port`] - Ledger, venue adapter and idempotency store traits
//! - [`application`] - Safety gate, keyer, router, OMS, reconciler, admission
//! - [`adapter`] - In-memory ledger and store, paper venue, CLI
//! - [`infrastructure`] - Configuration, composition root, scheduler
//!
//! # Features
//!
//! - `testkit` - Builders and a paper-venue harness for integration tests
//!
//! # Example
//!
//! ```no_run
//! use ordergate::application::router::VenueRouter;
//! use ordergate::domain::Venue;
//!
//! let venues = vec![
//!     Venue::new("BYBIT", 0.0006, 0.0001, 35, 0.70),
//!     Venue::new("OKX", 0.0004, 0.00012, 40, 0.65),
//! ];
//! let best = VenueRouter::default().pick_best(&venues, 50);
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
