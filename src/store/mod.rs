mod memory;

pub use memory::InMemoryOrderStore;

use async_trait::async_trait;

use crate::domain::order::{OrderSnapshot, StatusStateMap};

// ============================================================================
// Order Store Port
// ============================================================================
//
// The order platform owns the orders and the status->state configuration; this
// crate only reads snapshots, writes back approved transitions, and fetches
// the state map fresh per evaluation.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Order does not exist with order id {0}.")]
    NotFound(u64),

    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Snapshot of one order, by increment id.
    async fn get_order(&self, increment_id: u64) -> Result<OrderSnapshot, StoreError>;

    /// Persist an approved transition.
    async fn save_transition(
        &self,
        increment_id: u64,
        state: &str,
        status: &str,
    ) -> Result<(), StoreError>;

    /// The platform's status->state mapping, fetched fresh per evaluation.
    async fn state_map(&self) -> Result<StatusStateMap, StoreError>;
}
