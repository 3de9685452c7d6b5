//! custom_order_processing - order status update service core
//!
//! Exposes one operation for changing an order's status, guarded by a
//! per-(order, store, client) cooldown, plus a post-commit hook that logs
//! every change and notifies the customer when an order ships.
//!
//! # Modules
//!
//! - `domain`: snapshot/request value objects, rejection taxonomy, the pure
//!   transition validator, and the update handler
//! - `cooldown`: fixed-window rate limiter (in-memory and Redis backends)
//! - `store`: order store port the surrounding platform implements
//! - `observer`: post-commit changelog + shipment notification hook
//! - `config`: feature switch and cooldown lifetime
//! - `metrics`: Prometheus counters and the scrape endpoint

pub mod config;
pub mod cooldown;
pub mod domain;
pub mod metrics;
pub mod observer;
pub mod store;

pub use config::ProcessingConfig;
pub use cooldown::{CooldownGuard, CooldownKey, InMemoryCooldownStore, RedisCooldownStore};
pub use domain::order::{
    StatusUpdateHandler, StatusUpdateResponse, TransitionError, TransitionRequest,
};
pub use observer::StatusChangeObserver;
pub use store::{InMemoryOrderStore, OrderStore};
