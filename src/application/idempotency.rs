//! Idempotency keys for exactly-once order submission.
//!
//! Deterministic keys make bit-identical resubmissions of an intent collide;
//! random keys are for intents that must never be deduplicated, such as
//! manual retries.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{ClientKey, Side};
use crate::error::Result;
use crate::port::IdempotencyStore;

/// Namespace prefix on every client key.
pub const KEY_PREFIX: &str = "ANGEL";

/// Namespace of idempotency records in the backing store.
const STORE_PREFIX: &str = "idem";

/// Default retention of a seen mark.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Stable key for an intent.
///
/// `qty` and `px` are rendered with exactly 8 decimal places, so intents
/// that differ by one unit in the 8th decimal get distinct keys.
#[must_use]
pub fn deterministic_key(
    symbol: &str,
    side: Side,
    qty: Decimal,
    px: Decimal,
    intent_ts_ms: i64,
) -> ClientKey {
    ClientKey::new(format!(
        "{KEY_PREFIX}:{symbol}:{side}:{qty:.8}:{px:.8}:{intent_ts_ms}"
    ))
}

/// Globally unique key that never collides with another intent.
#[must_use]
pub fn random_key() -> ClientKey {
    ClientKey::new(format!("{KEY_PREFIX}:{}", Uuid::new_v4()))
}

/// Checks and marks client keys in an [`IdempotencyStore`].
#[derive(Clone)]
pub struct IdempotencyKeyer {
    store: Arc<dyn IdempotencyStore>,
    ttl: Duration,
}

impl IdempotencyKeyer {
    #[must_use]
    pub fn new(store: Arc<dyn IdempotencyStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    #[must_use]
    pub fn with_ttl(store: Arc<dyn IdempotencyStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Atomically check and mark `key`.
    ///
    /// Returns `true` only if the key was already marked before this call,
    /// i.e. the caller holds a duplicate. The first caller gets `false` and
    /// should proceed.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn seen(&self, key: &ClientKey) -> Result<bool> {
        let record = format!("{STORE_PREFIX}:{key}");
        let created = self.store.set_if_absent(&record, self.ttl).await?;
        if !created {
            debug!(client_key = %key, "Duplicate intent");
        }
        Ok(!created)
    }

    /// Evict expired marks from the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn evict_expired(&self) -> Result<usize> {
        self.store.evict_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deterministic_key_format() {
        let key = deterministic_key("BTCUSD", Side::Buy, dec!(1), dec!(20000), 123_456);
        assert_eq!(
            key.as_str(),
            "ANGEL:BTCUSD:BUY:1.00000000:20000.00000000:123456"
        );
    }

    #[test]
    fn deterministic_key_is_stable() {
        let a = deterministic_key("BTCUSD", Side::Buy, dec!(1.0), dec!(20000.0), 123_456);
        let b = deterministic_key("BTCUSD", Side::Buy, dec!(1), dec!(20000), 123_456);
        assert_eq!(a, b);
    }

    #[test]
    fn smallest_unit_changes_the_key() {
        let base = deterministic_key("BTCUSD", Side::Buy, dec!(1), dec!(20000), 123_456);
        let variants = [
            deterministic_key("BTCUSDT", Side::Buy, dec!(1), dec!(20000), 123_456),
            deterministic_key("BTCUSD", Side::Sell, dec!(1), dec!(20000), 123_456),
            deterministic_key("BTCUSD", Side::Buy, dec!(1.00000001), dec!(20000), 123_456),
            deterministic_key("BTCUSD", Side::Buy, dec!(1), dec!(20000.00000001), 123_456),
            deterministic_key("BTCUSD", Side::Buy, dec!(1), dec!(20000), 123_457),
        ];
        for v in variants {
            assert_ne!(base, v);
        }
    }

    #[test]
    fn random_key_is_prefixed_and_unique() {
        let a = random_key();
        let b = random_key();
        assert!(a.as_str().starts_with("ANGEL:"));
        assert_ne!(a, b);
    }
}
