//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  gate · keyer · router  │
//!     ┌──────────────┤   oms · reconciler      ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌─────────────┐
//! │ Venue   │            │   Ledger    │              │ Idempotency │
//! │ Adapter │            │             │              │    Store    │
//! └─────────┘            └─────────────┘              └─────────────┘
//! ```
//!
//! - [`VenueAdapter`] - order entry at one venue
//! - [`Ledger`] - local order records with atomic per-order updates
//! - [`IdempotencyStore`] - atomic set-if-absent with TTL

pub mod outbound;

pub use outbound::idempotency::IdempotencyStore;
pub use outbound::ledger::{Ledger, OrderMutation};
pub use outbound::venue::{CreateOrder, RemoteOrder, VenueAdapter};
