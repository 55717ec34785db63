//! Order management: the only writer of order state.
//!
//! Every transition goes through the ledger's atomic update, and every
//! operation on an order holds that order's lock, so no order is ever
//! transitioned by two callers at once.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::registry::VenueRegistry;
use crate::domain::{
    ApprovedDecision, CancelReason, ClientKey, NewOrder, Order, OrderId, OrderStatus, Side,
    VenueId, VenueOrderId,
};
use crate::error::{OrderError, Result, VenueError};
use crate::port::{CreateOrder, Ledger, RemoteOrder, VenueAdapter};

/// A trading intent ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIntent {
    pub client_key: ClientKey,
    pub symbol: String,
    pub side: Side,
    pub qty: Decimal,
    pub px: Decimal,
    pub tick_size: Decimal,
}

/// Order lifecycle events reported by a venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueEvent {
    Ack { venue_order_id: VenueOrderId },
    /// Cumulative filled quantity, below the order quantity.
    PartialFill { filled_qty: Decimal },
    Filled,
    Cancelled,
    Rejected { reason: String },
}

/// Default bound on a venue create.
pub const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(2);

/// Exclusive hold on one order's lock, taken without waiting.
///
/// Corrections that need it take `&OrderClaim`, so they can only run while
/// no submit, replace or cancel is in flight for the same order.
pub(crate) struct OrderClaim {
    order_id: OrderId,
    _guard: OwnedMutexGuard<()>,
}

impl OrderClaim {
    pub(crate) const fn order_id(&self) -> OrderId {
        self.order_id
    }
}

/// Order management system.
pub struct Oms {
    ledger: Arc<dyn Ledger>,
    venues: Arc<VenueRegistry>,
    locks: DashMap<OrderId, Arc<Mutex<()>>>,
    create_timeout: Duration,
}

impl Oms {
    #[must_use]
    pub fn new(ledger: Arc<dyn Ledger>, venues: Arc<VenueRegistry>) -> Self {
        Self::with_timeout(ledger, venues, DEFAULT_CREATE_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(
        ledger: Arc<dyn Ledger>,
        venues: Arc<VenueRegistry>,
        create_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            venues,
            locks: DashMap::new(),
            create_timeout,
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    #[must_use]
    pub fn venues(&self) -> &Arc<VenueRegistry> {
        &self.venues
    }

    /// Create the order in `NEW` and hand it to `venue`.
    ///
    /// Consumes a decision approved by the safety gate; the caller is
    /// responsible for having checked the intent's key with the
    /// idempotency keyer.
    ///
    /// A venue rejection terminalizes the order as `REJECT` and returns the
    /// venue error. A timeout leaves it `NEW`: the venue may hold the order,
    /// and the next reconciliation settles which.
    ///
    /// # Errors
    ///
    /// - [`OrderError::DuplicateClientKey`] if the key already reached the
    ///   ledger: an upstream dedupe failure
    /// - [`VenueError::UnknownVenue`] if `venue` is not registered
    /// - venue errors from order creation
    pub async fn submit(
        &self,
        intent: OrderIntent,
        approval: ApprovedDecision,
        venue: &VenueId,
    ) -> Result<Order> {
        let adapter = self.adapter(venue)?;

        let order = self
            .ledger
            .insert(NewOrder {
                client_key: intent.client_key,
                venue: venue.clone(),
                symbol: intent.symbol,
                side: intent.side,
                qty: intent.qty,
                px: intent.px,
                tick_size: intent.tick_size,
            })
            .await?;
        let order_id = order.order_id();
        let _guard = self.lock(order_id).await;

        // reconciliation may have settled it between insert and lock
        let order = self.load(order_id).await?;
        if order.status() != OrderStatus::New {
            return Err(OrderError::InvalidTransition {
                order_id,
                from: order.status(),
                to: OrderStatus::Ack,
            }
            .into());
        }

        info!(
            order_id = %order_id,
            client_key = %order.client_key(),
            venue = %venue,
            symbol = order.symbol(),
            side = %order.side(),
            qty = %order.qty(),
            px = %order.px(),
            gated_at_ms = ?approval.gated_at_ms(),
            "Submitting order"
        );

        let request = CreateOrder::from_order(&order);
        let created = tokio::time::timeout(self.create_timeout, adapter.create(&request))
            .await
            .unwrap_or_else(|_| {
                Err(VenueError::Timeout {
                    venue: venue.clone(),
                    timeout_ms: u64::try_from(self.create_timeout.as_millis()).unwrap_or(u64::MAX),
                })
            });

        match created {
            Ok(remote) => self.sync_from_remote(order, &remote).await,
            Err(e @ VenueError::Timeout { .. }) => {
                warn!(order_id = %order_id, error = %e, "Create timed out, leaving order NEW");
                Err(e.into())
            }
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "Venue refused order");
                let reason = e.to_string();
                self.ledger
                    .update(order_id, Box::new(move |o| o.reject(reason)))
                    .await?;
                self.release(order_id);
                Err(e.into())
            }
        }
    }

    /// Replace the desired price and quantity of an open order.
    ///
    /// If the venue already knows the order it is re-placed there with the
    /// new terms under the same client key.
    ///
    /// # Errors
    ///
    /// - [`OrderError::InvalidTransition`] if the order is terminal
    /// - [`OrderError::NotFound`] for unknown orders
    /// - venue errors from the re-place
    pub async fn replace(&self, order: &Order, px: Decimal, qty: Decimal) -> Result<Order> {
        let _guard = self.lock(order.order_id()).await;
        self.replace_locked(order.order_id(), px, qty, None).await
    }

    /// Take the order's lock if nobody holds it.
    ///
    /// Returns `None` while another operation on the order is in flight, such
    /// as a submit still waiting on the venue.
    pub(crate) fn try_claim(&self, order_id: OrderId) -> Option<OrderClaim> {
        let mutex = Arc::clone(self.locks.entry(order_id).or_default().value());
        let guard = mutex.try_lock_owned().ok()?;
        Some(OrderClaim {
            order_id,
            _guard: guard,
        })
    }

    /// Ledger copy of a claimed order, read under its lock.
    pub(crate) async fn claimed(&self, claim: &OrderClaim) -> Result<Order> {
        let order = self.load(claim.order_id).await?;
        if order.status().is_terminal() {
            self.release(claim.order_id);
        }
        Ok(order)
    }

    /// Terminalize a claimed order the venue has no record of.
    pub(crate) async fn cancel_missing(&self, claim: &OrderClaim) -> Result<Order> {
        let order = self
            .ledger
            .mark_cancelled(claim.order_id, CancelReason::VenueMissing)
            .await?;
        self.release(claim.order_id);
        Ok(order)
    }

    /// Advance a claimed `NEW` order to `ACK` with the venue's id.
    pub(crate) async fn sync_ack(
        &self,
        claim: &OrderClaim,
        venue_order_id: VenueOrderId,
    ) -> Result<Order> {
        self.ledger.mark_ack(claim.order_id, venue_order_id).await
    }

    /// Push a claimed order's local terms to the venue copy `remote`.
    ///
    /// Local terms win: the venue order is re-placed at the ledger's px/qty.
    pub(crate) async fn push_local_terms(
        &self,
        claim: &OrderClaim,
        remote: &RemoteOrder,
    ) -> Result<Order> {
        let current = self.load(claim.order_id).await?;
        self.replace_locked(
            current.order_id(),
            current.px(),
            current.qty(),
            Some(remote.venue_order_id.clone()),
        )
        .await
    }

    /// Cancel an open order at its venue and terminalize it.
    ///
    /// # Errors
    ///
    /// - [`OrderError::InvalidTransition`] if the order is terminal
    /// - venue errors from the cancel; the order stays open
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order> {
        let _guard = self.lock(order_id).await;
        let order = self.load(order_id).await?;
        if order.status().is_terminal() {
            return Err(OrderError::InvalidTransition {
                order_id,
                from: order.status(),
                to: OrderStatus::Cancelled,
            }
            .into());
        }

        if let Some(venue_order_id) = order.venue_order_id() {
            self.adapter(order.venue())?.cancel(venue_order_id).await?;
        }
        let cancelled = self
            .ledger
            .mark_cancelled(order_id, CancelReason::Requested)
            .await?;
        info!(order_id = %order_id, "Order cancelled");
        self.release(order_id);
        Ok(cancelled)
    }

    /// Apply a venue-reported lifecycle event.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] when the event would move the
    /// order out of a terminal state or otherwise break the state machine.
    pub async fn apply(&self, order_id: OrderId, event: VenueEvent) -> Result<Order> {
        let _guard = self.lock(order_id).await;
        debug!(order_id = %order_id, event = ?event, "Applying venue event");
        let order = match event {
            VenueEvent::Ack { venue_order_id } => {
                self.ledger.mark_ack(order_id, venue_order_id).await?
            }
            VenueEvent::PartialFill { filled_qty } => {
                self.ledger
                    .update(order_id, Box::new(move |o| o.record_fill(filled_qty)))
                    .await?
            }
            VenueEvent::Filled => {
                self.ledger
                    .update(order_id, Box::new(|o| o.record_fill(o.qty())))
                    .await?
            }
            VenueEvent::Cancelled => {
                self.ledger
                    .mark_cancelled(order_id, CancelReason::Venue)
                    .await?
            }
            VenueEvent::Rejected { reason } => {
                self.ledger
                    .update(order_id, Box::new(move |o| o.reject(reason)))
                    .await?
            }
        };
        if order.status().is_terminal() {
            self.release(order_id);
        }
        Ok(order)
    }

    async fn replace_locked(
        &self,
        order_id: OrderId,
        px: Decimal,
        qty: Decimal,
        remote_id: Option<VenueOrderId>,
    ) -> Result<Order> {
        let amended = self
            .ledger
            .update(order_id, Box::new(move |o| o.amend(px, qty)))
            .await?;

        let Some(venue_order_id) = remote_id.or_else(|| amended.venue_order_id().cloned()) else {
            debug!(order_id = %order_id, "Venue has not seen the order, amended locally");
            return Ok(amended);
        };

        let adapter = self.adapter(amended.venue())?;
        let replaced = adapter
            .replace(&venue_order_id, &CreateOrder::from_order(&amended))
            .await?;
        info!(
            order_id = %order_id,
            old_venue_order_id = %venue_order_id,
            new_venue_order_id = %replaced.venue_order_id,
            px = %px,
            qty = %qty,
            "Order replaced at venue"
        );
        let new_id = replaced.venue_order_id;
        let remote_status = replaced.status;
        self.ledger
            .update(
                order_id,
                Box::new(move |o| {
                    if o.status() == OrderStatus::New
                        && matches!(remote_status, OrderStatus::Ack | OrderStatus::Partial)
                    {
                        return o.acknowledge(new_id);
                    }
                    o.set_venue_order_id(new_id);
                    Ok(())
                }),
            )
            .await
    }

    /// Bring a freshly created order in line with the venue's response.
    async fn sync_from_remote(&self, order: Order, remote: &RemoteOrder) -> Result<Order> {
        let order_id = order.order_id();
        let venue_order_id = remote.venue_order_id.clone();
        let order = match remote.status {
            OrderStatus::New => order,
            OrderStatus::Reject => {
                let reason = format!("venue order {venue_order_id} rejected");
                self.ledger
                    .update(order_id, Box::new(move |o| o.reject(reason)))
                    .await?
            }
            _ => self.ledger.mark_ack(order_id, venue_order_id).await?,
        };
        info!(
            order_id = %order_id,
            status = %order.status(),
            venue_order_id = ?order.venue_order_id(),
            "Order accepted by venue"
        );
        Ok(order)
    }

    async fn load(&self, order_id: OrderId) -> Result<Order> {
        self.ledger
            .get(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id).into())
    }

    fn adapter(&self, venue: &VenueId) -> Result<Arc<dyn VenueAdapter>> {
        self.venues
            .adapter(venue)
            .ok_or_else(|| VenueError::UnknownVenue(venue.clone()).into())
    }

    async fn lock(&self, order_id: OrderId) -> OwnedMutexGuard<()> {
        let mutex = Arc::clone(self.locks.entry(order_id).or_default().value());
        mutex.lock_owned().await
    }

    /// Drop the lock entry of a terminal order.
    fn release(&self, order_id: OrderId) {
        self.locks.remove(&order_id);
    }
}
