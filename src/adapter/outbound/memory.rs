//! In-memory ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{ClientKey, NewOrder, Order, OrderId};
use crate::error::{OrderError, Result};
use crate::port::{Ledger, OrderMutation};

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    orders: HashMap<OrderId, Order>,
    by_client_key: HashMap<ClientKey, OrderId>,
}

/// Ledger kept entirely in process memory.
///
/// Updates run on a copy of the order under the write lock and are committed
/// only if the mutation succeeds.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<State>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders ever inserted, terminal ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn insert(&self, new: NewOrder) -> Result<Order> {
        let mut state = self.state.write();
        if let Some(existing) = state.by_client_key.get(&new.client_key) {
            return Err(OrderError::DuplicateClientKey {
                client_key: new.client_key.to_string(),
                existing: *existing,
            }
            .into());
        }
        state.next_id += 1;
        let order_id = OrderId::new(state.next_id);
        let order = Order::new(order_id, new);
        state
            .by_client_key
            .insert(order.client_key().clone(), order_id);
        state.orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().orders.get(&order_id).cloned())
    }

    async fn find_by_client_key(&self, client_key: &ClientKey) -> Result<Option<Order>> {
        let state = self.state.read();
        Ok(state
            .by_client_key
            .get(client_key)
            .and_then(|id| state.orders.get(id))
            .cloned())
    }

    async fn list_open(&self) -> Result<Vec<Order>> {
        let state = self.state.read();
        let mut open: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.status().is_open())
            .cloned()
            .collect();
        open.sort_by_key(Order::order_id);
        Ok(open)
    }

    async fn update(&self, order_id: OrderId, mutation: OrderMutation) -> Result<Order> {
        let mut state = self.state.write();
        let stored = state
            .orders
            .get_mut(&order_id)
            .ok_or(OrderError::NotFound(order_id))?;
        let mut draft = stored.clone();
        mutation(&mut draft)?;
        *stored = draft.clone();
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CancelReason, OrderStatus, Side, VenueId, VenueOrderId};
    use crate::error::Error;
    use rust_decimal_macros::dec;

    fn new_order(key: &str) -> NewOrder {
        NewOrder {
            client_key: ClientKey::from(key),
            venue: VenueId::from("binance"),
            symbol: "ETHUSDT".into(),
            side: Side::Sell,
            qty: dec!(2),
            px: dec!(1800),
            tick_size: dec!(0.01),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let ledger = MemoryLedger::new();
        let a = ledger.insert(new_order("a")).await.unwrap();
        let b = ledger.insert(new_order("b")).await.unwrap();
        assert_eq!(a.order_id(), OrderId::new(1));
        assert_eq!(b.order_id(), OrderId::new(2));
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_client_key_is_refused() {
        let ledger = MemoryLedger::new();
        ledger.insert(new_order("a")).await.unwrap();
        let err = ledger.insert(new_order("a")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Order(OrderError::DuplicateClientKey { existing, .. }) if existing == OrderId::new(1)
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_order_untouched() {
        let ledger = MemoryLedger::new();
        let order = ledger.insert(new_order("a")).await.unwrap();
        let id = order.order_id();
        ledger.mark_cancelled(id, CancelReason::Requested).await.unwrap();

        let err = ledger
            .mark_ack(id, VenueOrderId::from("v-1"))
            .await
            .unwrap_err();
        assert!(err.is_invariant_violation());

        let stored = ledger.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Cancelled);
        assert!(stored.venue_order_id().is_none());
    }

    #[tokio::test]
    async fn list_open_excludes_terminal_orders() {
        let ledger = MemoryLedger::new();
        let a = ledger.insert(new_order("a")).await.unwrap();
        ledger.insert(new_order("b")).await.unwrap();
        ledger
            .mark_cancelled(a.order_id(), CancelReason::VenueMissing)
            .await
            .unwrap();

        let open = ledger.list_open().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].client_key().as_str(), "b");
        assert!(ledger
            .find_by_client_key(&ClientKey::from("a"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn update_of_unknown_order_is_not_found() {
        let ledger = MemoryLedger::new();
        let err = ledger
            .update(OrderId::new(9), Box::new(|_| Ok(())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Order(OrderError::NotFound(_))));
    }
}
