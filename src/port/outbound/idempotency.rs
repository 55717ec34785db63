//! Idempotency store port.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Key/value store with an atomic set-if-absent and TTL.
///
/// Equivalent to `SETNX` + `EXPIRE` executed as one operation: there must be
/// no window between the existence check and the write.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Record `key` if it is absent or expired.
    ///
    /// Returns `true` if this call created the record, `false` if a live
    /// record already existed. Among concurrent callers with the same key,
    /// exactly one observes `true`.
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Evict expired records. Returns the number removed.
    async fn evict_expired(&self) -> Result<usize>;
}
