use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{OrderStore, StoreError};
use crate::domain::order::{OrderSnapshot, StatusStateMap};

// ============================================================================
// In-Memory Order Store
// ============================================================================
//
// Backs the demo binary and the tests. Holds full order records keyed by
// increment id plus one shared state map.
//
// ============================================================================

#[derive(Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<Mutex<HashMap<u64, OrderSnapshot>>>,
    states: StatusStateMap,
}

impl InMemoryOrderStore {
    pub fn new(states: StatusStateMap) -> Self {
        Self {
            orders: Arc::new(Mutex::new(HashMap::new())),
            states,
        }
    }

    pub async fn insert(&self, snapshot: OrderSnapshot) {
        let mut orders = self.orders.lock().await;
        orders.insert(snapshot.increment_id, snapshot);
    }

    /// Shipment flag is not part of a transition save, so tests flip it here.
    pub async fn set_has_shipments(&self, increment_id: u64, has_shipments: bool) {
        let mut orders = self.orders.lock().await;
        if let Some(order) = orders.get_mut(&increment_id) {
            order.has_shipments = has_shipments;
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get_order(&self, increment_id: u64) -> Result<OrderSnapshot, StoreError> {
        let orders = self.orders.lock().await;
        orders
            .get(&increment_id)
            .cloned()
            .ok_or(StoreError::NotFound(increment_id))
    }

    async fn save_transition(
        &self,
        increment_id: u64,
        state: &str,
        status: &str,
    ) -> Result<(), StoreError> {
        let mut orders = self.orders.lock().await;
        let order = orders
            .get_mut(&increment_id)
            .ok_or(StoreError::NotFound(increment_id))?;

        order.state = state.to_string();
        order.status = status.to_string();
        Ok(())
    }

    async fn state_map(&self) -> Result<StatusStateMap, StoreError> {
        Ok(self.states.clone())
    }
}
