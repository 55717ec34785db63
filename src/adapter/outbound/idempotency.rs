//! In-memory idempotency store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::Result;
use crate::port::IdempotencyStore;

/// Default number of live records above which the store warns.
pub const DEFAULT_MAX_ENTRIES: usize = 1_000_000;

#[derive(Debug, Clone, Copy)]
struct Record {
    expires: Instant,
}

impl Record {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires
    }
}

/// Set-if-absent store backed by a concurrent hash map.
///
/// Check and write happen under the map's per-shard entry lock, so two
/// callers racing on one key cannot both create it. Expired records are
/// treated as absent and dropped lazily or by [`gc`](Self::gc).
///
/// A live record is never evicted: forgetting a key inside its TTL would let
/// a retried intent through twice. `max_entries` is a capacity alarm, not a
/// hard limit.
#[derive(Debug)]
pub struct MemoryIdempotencyStore {
    records: DashMap<String, Record>,
    max_entries: usize,
}

impl Default for MemoryIdempotencyStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryIdempotencyStore {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            records: DashMap::new(),
            max_entries,
        }
    }

    /// Records currently held, including expired ones not yet collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop expired records.
    ///
    /// Returns the number of records removed. Warns if the live records
    /// still exceed `max_entries`.
    pub fn gc(&self) -> usize {
        let before = self.records.len();
        let now = Instant::now();
        self.records.retain(|_, record| record.is_live(now));

        let remaining = self.records.len();
        let removed = before.saturating_sub(remaining);
        if removed > 0 {
            debug!(removed, remaining, "Idempotency records collected");
        }
        if remaining > self.max_entries {
            warn!(
                live = remaining,
                max_entries = self.max_entries,
                "Idempotency store above capacity, live keys retained"
            );
        }
        removed
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let record = Record {
            expires: now + ttl,
        };

        let created = match self.records.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    false
                } else {
                    occupied.insert(record);
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(record);
                true
            }
        };

        if created && self.records.len() > self.max_entries {
            self.gc();
        }
        Ok(created)
    }

    async fn evict_expired(&self) -> Result<usize> {
        Ok(self.gc())
    }
}
