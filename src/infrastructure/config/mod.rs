//! Infrastructure configuration modules.

pub mod clock;
pub mod idempotency;
pub mod logging;
pub mod reconcile;
pub mod risk;
pub mod router;
pub mod settings;
pub mod venue;

pub use settings::Config;
