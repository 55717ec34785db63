//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the control plane's use cases.

pub mod admission;
pub mod idempotency;
pub mod oms;
pub mod reconcile;
pub mod registry;
pub mod router;
pub mod safety;

pub use admission::{Admission, AdmissionOutcome, AdmissionRejection, AdmissionRequest};
pub use idempotency::{deterministic_key, random_key, IdempotencyKeyer};
pub use oms::{Oms, OrderIntent, VenueEvent};
pub use reconcile::{ReconcileReport, Reconciler};
pub use registry::VenueRegistry;
pub use router::{RouterWeights, VenueRouter};
pub use safety::{RiskLimits, SafetyGate};
