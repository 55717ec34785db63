//! Paper venue: an in-memory order book of resting orders.
//!
//! Acknowledges every create, supports cancel, and exposes hooks to inject
//! the failures reconciliation must cope with: drifted terms, orders the
//! venue lost, outages and slow responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{ClientKey, OrderStatus, VenueId, VenueOrderId};
use crate::error::VenueError;
use crate::port::{CreateOrder, RemoteOrder, VenueAdapter};

/// In-memory [`VenueAdapter`].
pub struct PaperVenue {
    venue: VenueId,
    orders: Mutex<HashMap<VenueOrderId, RemoteOrder>>,
    failing: AtomicBool,
    rejecting: AtomicBool,
    delay: Mutex<Option<Duration>>,
    create_delay: Mutex<Option<Duration>>,
}

impl PaperVenue {
    #[must_use]
    pub fn new(venue: impl Into<VenueId>) -> Self {
        Self {
            venue: venue.into(),
            orders: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
            rejecting: AtomicBool::new(false),
            delay: Mutex::new(None),
            create_delay: Mutex::new(None),
        }
    }

    /// Place an order directly on the book, bypassing `create`.
    pub fn seed(&self, order: RemoteOrder) {
        self.orders
            .lock()
            .insert(order.venue_order_id.clone(), order);
    }

    /// Change the terms of the resting order with `client_key`.
    ///
    /// Returns `false` if no such order rests here.
    pub fn amend(&self, client_key: &ClientKey, px: Decimal, qty: Decimal) -> bool {
        let mut orders = self.orders.lock();
        match orders.values_mut().find(|o| &o.client_key == client_key) {
            Some(order) => {
                order.px = px;
                order.qty = qty;
                true
            }
            None => false,
        }
    }

    /// Forget the order with `client_key`, as if the venue lost it.
    pub fn drop_order(&self, client_key: &ClientKey) -> bool {
        let mut orders = self.orders.lock();
        let before = orders.len();
        orders.retain(|_, o| &o.client_key != client_key);
        orders.len() != before
    }

    /// Make every call fail with [`VenueError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// Reject creates and cancels while still answering `list_open`.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::Release);
    }

    /// Delay every call by `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    /// Delay only `create`, on top of any [`set_delay`](Self::set_delay).
    pub fn set_create_delay(&self, delay: Option<Duration>) {
        *self.create_delay.lock() = delay;
    }

    /// Number of resting orders.
    #[must_use]
    pub fn resting(&self) -> usize {
        self.orders.lock().len()
    }

    async fn enter(&self) -> Result<(), VenueError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::Acquire) {
            return Err(VenueError::Unavailable {
                venue: self.venue.clone(),
                reason: "paper venue set to fail".into(),
            });
        }
        Ok(())
    }

    fn check_writable(&self, action: &str) -> Result<(), VenueError> {
        if self.rejecting.load(Ordering::Acquire) {
            return Err(VenueError::Rejected {
                venue: self.venue.clone(),
                reason: format!("paper venue refusing {action}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VenueAdapter for PaperVenue {
    fn venue(&self) -> &VenueId {
        &self.venue
    }

    async fn list_open(&self) -> Result<Vec<RemoteOrder>, VenueError> {
        self.enter().await?;
        let mut open: Vec<RemoteOrder> = self.orders.lock().values().cloned().collect();
        open.sort_by(|a, b| a.client_key.cmp(&b.client_key));
        Ok(open)
    }

    async fn create(&self, request: &CreateOrder) -> Result<RemoteOrder, VenueError> {
        self.enter().await?;
        let create_delay = *self.create_delay.lock();
        if let Some(delay) = create_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_writable("create")?;
        if request.qty <= Decimal::ZERO || request.px <= Decimal::ZERO {
            return Err(VenueError::Rejected {
                venue: self.venue.clone(),
                reason: format!("invalid terms {} @ {}", request.qty, request.px),
            });
        }

        let order = RemoteOrder {
            client_key: request.client_key.clone(),
            venue_order_id: VenueOrderId::new(Uuid::new_v4().to_string()),
            status: OrderStatus::Ack,
            px: request.px,
            qty: request.qty,
        };
        debug!(
            venue = %self.venue,
            client_key = %order.client_key,
            venue_order_id = %order.venue_order_id,
            "Paper order accepted"
        );
        self.seed(order.clone());
        Ok(order)
    }

    async fn cancel(&self, venue_order_id: &VenueOrderId) -> Result<(), VenueError> {
        self.enter().await?;
        self.check_writable("cancel")?;
        match self.orders.lock().remove(venue_order_id) {
            Some(_) => Ok(()),
            None => Err(VenueError::Rejected {
                venue: self.venue.clone(),
                reason: format!("unknown order {venue_order_id}"),
            }),
        }
    }

    async fn close(&self) -> Result<(), VenueError> {
        let dropped = {
            let mut orders = self.orders.lock();
            let n = orders.len();
            orders.clear();
            n
        };
        info!(venue = %self.venue, dropped, "Paper venue closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;
    use rust_decimal_macros::dec;

    fn request(key: &str) -> CreateOrder {
        CreateOrder {
            client_key: ClientKey::from(key),
            symbol: "BTCUSDT".into(),
            side: Side::Buy,
            qty: dec!(1),
            px: dec!(100),
        }
    }

    #[tokio::test]
    async fn create_acknowledges_and_rests() {
        let venue = PaperVenue::new("paper");
        let remote = venue.create(&request("k")).await.unwrap();
        assert_eq!(remote.status, OrderStatus::Ack);
        assert_eq!(venue.list_open().await.unwrap(), vec![remote]);
    }

    #[tokio::test]
    async fn cancel_unknown_order_is_rejected() {
        let venue = PaperVenue::new("paper");
        let err = venue.cancel(&VenueOrderId::from("nope")).await.unwrap_err();
        assert!(matches!(err, VenueError::Rejected { .. }));
    }

    #[tokio::test]
    async fn replace_swaps_the_resting_order() {
        let venue = PaperVenue::new("paper");
        let first = venue.create(&request("k")).await.unwrap();
        let mut changed = request("k");
        changed.px = dec!(101);
        let second = venue.replace(&first.venue_order_id, &changed).await.unwrap();

        let open = venue.list_open().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].venue_order_id, second.venue_order_id);
        assert_eq!(open[0].px, dec!(101));
    }

    #[tokio::test]
    async fn hooks_shape_the_remote_view() {
        let venue = PaperVenue::new("paper");
        venue.create(&request("a")).await.unwrap();
        venue.create(&request("b")).await.unwrap();

        assert!(venue.amend(&ClientKey::from("a"), dec!(99), dec!(3)));
        assert!(venue.drop_order(&ClientKey::from("b")));
        assert!(!venue.drop_order(&ClientKey::from("b")));

        let open = venue.list_open().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!((open[0].px, open[0].qty), (dec!(99), dec!(3)));

        venue.set_failing(true);
        assert!(matches!(
            venue.list_open().await,
            Err(VenueError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn rejecting_venue_still_lists_orders() {
        let venue = PaperVenue::new("paper");
        let resting = venue.create(&request("a")).await.unwrap();
        venue.set_rejecting(true);

        assert!(matches!(
            venue.cancel(&resting.venue_order_id).await,
            Err(VenueError::Rejected { .. })
        ));
        assert!(venue.create(&request("b")).await.is_err());
        assert_eq!(venue.list_open().await.unwrap(), vec![resting]);
    }
}
