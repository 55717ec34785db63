//! Ledger-versus-venue reconciliation.
//!
//! The ledger's open orders are the local truth, each venue's open orders the
//! remote truth. A run polls every venue concurrently, then walks the local
//! orders one at a time and corrects drift:
//!
//! - no remote match by client key: cancelled as `VenueMissing`
//! - local `NEW`, remote `ACK`/`PARTIAL`: advanced to `ACK` with the venue id
//! - price off by more than a tick, or quantity differs: re-placed with the
//!   local terms
//!
//! Orders on a venue that failed or timed out are skipped for the run, never
//! treated as missing. So are orders another OMS operation holds, and orders
//! changed after the venue poll began: a submit still waiting on its create
//! is not yet in the venue's snapshot. Running twice against unchanged venues performs no
//! corrections the second time.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::oms::Oms;
use crate::domain::{ClientKey, OrderId, OrderStatus, VenueId};
use crate::error::{Error, Result, VenueError};
use crate::port::RemoteOrder;

/// Default bound on a single venue's `list_open`.
pub const DEFAULT_VENUE_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub cancelled_stale: usize,
    pub replaced: usize,
    pub ack_synced: usize,
    /// Local orders left alone because their venue could not be polled.
    pub skipped: usize,
    pub unreachable_venues: BTreeSet<VenueId>,
}

impl ReconcileReport {
    /// Total corrections applied to the ledger or venues.
    #[must_use]
    pub const fn corrections(&self) -> usize {
        self.cancelled_stale + self.replaced + self.ack_synced
    }

    /// No corrections and every venue answered.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.corrections() == 0 && self.unreachable_venues.is_empty()
    }
}

/// Reconciles the ledger against every registered venue.
pub struct Reconciler {
    oms: Arc<Oms>,
    venue_timeout: Duration,
}

impl Reconciler {
    #[must_use]
    pub fn new(oms: Arc<Oms>) -> Self {
        Self::with_timeout(oms, DEFAULT_VENUE_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(oms: Arc<Oms>, venue_timeout: Duration) -> Self {
        Self { oms, venue_timeout }
    }

    /// Run one reconciliation pass.
    ///
    /// # Errors
    ///
    /// Ledger failures and invariant violations abort the run. Corrections
    /// already applied stay applied; each is a complete ledger transition.
    /// Venue failures during a correction are logged and that order is
    /// counted as skipped.
    pub async fn reconcile_all(&self) -> Result<ReconcileReport> {
        let polled_at = Utc::now();
        let (remote, unreachable) = self.poll_venues().await;
        let local = self.oms.ledger().list_open().await?;

        let mut report = ReconcileReport {
            unreachable_venues: unreachable,
            ..ReconcileReport::default()
        };

        for order in local {
            let Some(book) = remote.get(order.venue()) else {
                debug!(
                    order_id = %order.order_id(),
                    venue = %order.venue(),
                    "Venue not polled, skipping order"
                );
                report.skipped += 1;
                continue;
            };
            self.reconcile_order(order.order_id(), book, polled_at, &mut report)
                .await?;
        }

        info!(
            cancelled_stale = report.cancelled_stale,
            replaced = report.replaced,
            ack_synced = report.ack_synced,
            skipped = report.skipped,
            unreachable = report.unreachable_venues.len(),
            "Reconciliation complete"
        );
        Ok(report)
    }

    async fn reconcile_order(
        &self,
        order_id: OrderId,
        book: &HashMap<ClientKey, RemoteOrder>,
        polled_at: DateTime<Utc>,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let Some(claim) = self.oms.try_claim(order_id) else {
            debug!(order_id = %order_id, "Order busy, skipping");
            report.skipped += 1;
            return Ok(());
        };
        let order = self.oms.claimed(&claim).await?;
        if order.status().is_terminal() {
            return Ok(());
        }
        // the venue snapshot predates this order's last change
        if order.updated_at() >= polled_at {
            debug!(order_id = %order_id, "Order changed after venue poll, skipping");
            report.skipped += 1;
            return Ok(());
        }

        let Some(remote) = book.get(order.client_key()) else {
            warn!(
                order_id = %order_id,
                client_key = %order.client_key(),
                venue = %order.venue(),
                "Order missing at venue, cancelling"
            );
            self.oms.cancel_missing(&claim).await?;
            report.cancelled_stale += 1;
            return Ok(());
        };

        let order = if order.status() == OrderStatus::New
            && matches!(remote.status, OrderStatus::Ack | OrderStatus::Partial)
        {
            debug!(
                order_id = %order_id,
                venue_order_id = %remote.venue_order_id,
                "Syncing venue acknowledgement"
            );
            report.ack_synced += 1;
            self.oms
                .sync_ack(&claim, remote.venue_order_id.clone())
                .await?
        } else {
            order
        };

        if order.price_drifted(remote.px) || remote.qty != order.qty() {
            debug!(
                order_id = %claim.order_id(),
                local_px = %order.px(),
                remote_px = %remote.px,
                local_qty = %order.qty(),
                remote_qty = %remote.qty,
                "Terms drifted, re-placing with local terms"
            );
            match self.oms.push_local_terms(&claim, remote).await {
                Ok(_) => report.replaced += 1,
                Err(Error::Venue(e)) => {
                    warn!(order_id = %order_id, error = %e, "Replace failed, retrying next run");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Open orders per reachable venue, keyed by client key, and the set of
    /// venues that failed or timed out.
    async fn poll_venues(
        &self,
    ) -> (
        HashMap<VenueId, HashMap<ClientKey, RemoteOrder>>,
        BTreeSet<VenueId>,
    ) {
        let registry = self.oms.venues();
        let polls = registry.adapters().into_iter().map(|(venue, adapter)| {
            let timeout = self.venue_timeout;
            async move {
                let result = match tokio::time::timeout(timeout, adapter.list_open()).await {
                    Ok(result) => result,
                    Err(_) => Err(VenueError::Timeout {
                        venue: venue.clone(),
                        timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    }),
                };
                (venue, result)
            }
        });

        let mut remote = HashMap::new();
        let mut unreachable = BTreeSet::new();
        for (venue, result) in join_all(polls).await {
            match result {
                Ok(orders) => {
                    registry.set_reachable(&venue, true);
                    let book = orders
                        .into_iter()
                        .map(|o| (o.client_key.clone(), o))
                        .collect();
                    remote.insert(venue, book);
                }
                Err(e) => {
                    warn!(venue = %venue, error = %e, "Venue poll failed, excluding from run");
                    registry.set_reachable(&venue, false);
                    unreachable.insert(venue);
                }
            }
        }
        (remote, unreachable)
    }
}
