//! Ledger port: the system of record for local orders.

use async_trait::async_trait;

use crate::domain::{CancelReason, ClientKey, NewOrder, Order, OrderId, VenueOrderId};
use crate::error::{OrderError, Result};

/// A read-modify-write step applied to one order.
///
/// Returning `Err` aborts the write; the stored order is left untouched.
pub type OrderMutation = Box<dyn FnOnce(&mut Order) -> std::result::Result<(), OrderError> + Send>;

/// Storage of orders with atomic per-order updates.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - [`update`](Self::update) must be atomic per order: concurrent callers
///   never observe a half-applied mutation
/// - Orders are never deleted, only terminalized
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Persist a new order in `NEW`, assigning its `order_id`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::DuplicateClientKey`] if an order with the same
    /// client key already exists.
    async fn insert(&self, order: NewOrder) -> Result<Order>;

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;

    async fn find_by_client_key(&self, client_key: &ClientKey) -> Result<Option<Order>>;

    /// All orders in a non-terminal status.
    async fn list_open(&self) -> Result<Vec<Order>>;

    /// Atomically apply `mutation` to the order and return the result.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] for unknown ids, or whatever error the
    /// mutation returns.
    async fn update(&self, order_id: OrderId, mutation: OrderMutation) -> Result<Order>;

    /// Terminalize an order as `CANCELLED`.
    async fn mark_cancelled(&self, order_id: OrderId, reason: CancelReason) -> Result<Order> {
        self.update(order_id, Box::new(move |order| order.cancel(reason)))
            .await
    }

    /// Advance an order from `NEW` to `ACK`, recording the venue order id.
    async fn mark_ack(&self, order_id: OrderId, venue_order_id: VenueOrderId) -> Result<Order> {
        self.update(
            order_id,
            Box::new(move |order| order.acknowledge(venue_order_id)),
        )
        .await
    }
}
