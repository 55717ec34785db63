//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`]: Builders for orders, decisions, portfolios and venues.
//! - [`config`]: Canonical test configurations.
//! - [`harness`]: A control plane over an in-memory ledger and paper venues.

pub mod config;
pub mod domain;
pub mod harness;
