//! Venue adapter port.
//!
//! Every venue implements the same fixed capability set: list open orders,
//! create, cancel. Venue-specific quirks stay behind this trait; call sites
//! never branch on a venue's name.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{ClientKey, Order, OrderStatus, Side, VenueId, VenueOrderId};
use crate::error::VenueError;

/// An open order as the venue reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOrder {
    pub client_key: ClientKey,
    pub venue_order_id: VenueOrderId,
    pub status: OrderStatus,
    pub px: Decimal,
    pub qty: Decimal,
}

/// A limit order to place at a venue.
///
/// The client key travels with the order so reconciliation can match the
/// venue's view back to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub client_key: ClientKey,
    pub symbol: String,
    pub side: Side,
    pub qty: Decimal,
    pub px: Decimal,
}

impl CreateOrder {
    /// Request reflecting the order's current desired terms.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            client_key: order.client_key().clone(),
            symbol: order.symbol().to_string(),
            side: order.side(),
            qty: order.qty(),
            px: order.px(),
        }
    }
}

/// Order entry at a single venue.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    /// Venue this adapter talks to.
    fn venue(&self) -> &VenueId;

    /// Orders the venue currently considers open.
    async fn list_open(&self) -> Result<Vec<RemoteOrder>, VenueError>;

    async fn create(&self, request: &CreateOrder) -> Result<RemoteOrder, VenueError>;

    async fn cancel(&self, venue_order_id: &VenueOrderId) -> Result<(), VenueError>;

    /// Re-place an order with new terms.
    ///
    /// Default implementation cancels then creates; venues with native
    /// amend support may override.
    async fn replace(
        &self,
        venue_order_id: &VenueOrderId,
        request: &CreateOrder,
    ) -> Result<RemoteOrder, VenueError> {
        self.cancel(venue_order_id).await?;
        self.create(request).await
    }

    /// Release connections held by the adapter.
    async fn close(&self) -> Result<(), VenueError> {
        Ok(())
    }
}
