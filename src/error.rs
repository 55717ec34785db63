use thiserror::Error;

use crate::domain::id::{OrderId, VenueId};
use crate::domain::order::OrderStatus;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Order state machine and submission invariant violations.
///
/// These indicate upstream dedupe or state-machine misuse and are never
/// swallowed: they surface to the caller of `submit`, `replace` or
/// `reconcile_all` as hard errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("invalid transition from {from} to {to} for order {order_id}")]
    InvalidTransition {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("client key {client_key} already belongs to order {existing}")]
    DuplicateClientKey {
        client_key: String,
        existing: OrderId,
    },

    #[error("order not found: {0}")]
    NotFound(OrderId),
}

/// Venue adapter failures.
///
/// Treated as "unknown state for this venue this cycle": reconciliation
/// excludes the venue rather than aborting the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VenueError {
    #[error("venue {venue} unavailable: {reason}")]
    Unavailable { venue: VenueId, reason: String },

    #[error("venue {venue} timed out after {timeout_ms}ms")]
    Timeout { venue: VenueId, timeout_ms: u64 },

    #[error("venue {venue} rejected request: {reason}")]
    Rejected { venue: VenueId, reason: String },

    #[error("unknown venue: {0}")]
    UnknownVenue(VenueId),
}

/// Venue selection failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("no venue within {max_latency_ms}ms p99 latency")]
    NoEligibleVenue { max_latency_ms: u32 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Venue(#[from] VenueError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for errors that indicate state-machine or dedupe misuse.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Order(_))
    }
}
