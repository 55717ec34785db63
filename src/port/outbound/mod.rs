//! Outbound ports: collaborators this crate drives.

pub mod idempotency;
pub mod ledger;
pub mod venue;
