//! Outbound adapters (driven side).

pub mod idempotency;
pub mod memory;
pub mod paper;

pub use idempotency::MemoryIdempotencyStore;
pub use memory::MemoryLedger;
pub use paper::PaperVenue;
