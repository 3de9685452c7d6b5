use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ProcessingConfig;
use crate::cooldown::{CooldownGuard, CooldownKey};
use crate::metrics::Metrics;
use crate::observer::StatusChangeObserver;
use crate::store::{OrderStore, StoreError};

use super::errors::TransitionError;
use super::validator;
use super::value_objects::{StatusChange, TransitionRequest};

// ============================================================================
// Status Update Handler
// ============================================================================
//
// Orchestrates one status-update attempt:
//   feature gate -> parse -> order lookup -> cooldown -> validate -> save
//   -> post-commit observer (fire-and-forget)
//
// Every rejection is caught here and rendered as {status: false, message};
// nothing propagates to the transport layer.
//
// ============================================================================

/// Wire response; the endpoint returns a single-element list of these.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StatusUpdateResponse {
    pub status: bool,
    pub message: String,
}

pub struct StatusUpdateHandler {
    config: Arc<ProcessingConfig>,
    store: Arc<dyn OrderStore>,
    guard: CooldownGuard,
    observer: Arc<StatusChangeObserver>,
    metrics: Arc<Metrics>,
}

impl StatusUpdateHandler {
    pub fn new(
        config: Arc<ProcessingConfig>,
        store: Arc<dyn OrderStore>,
        guard: CooldownGuard,
        observer: Arc<StatusChangeObserver>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            config,
            store,
            guard,
            observer,
            metrics,
        }
    }

    /// Handle one status-update request from the remote endpoint.
    pub async fn update_order_status(
        &self,
        request: TransitionRequest,
        client_addr: &str,
    ) -> Vec<StatusUpdateResponse> {
        let started = Instant::now();
        let correlation_id = Uuid::new_v4();
        self.metrics.status_update_attempts.inc();

        let (outcome, response) = match self.process(&request, client_addr, correlation_id).await {
            Ok(message) => {
                tracing::info!(
                    correlation_id = %correlation_id,
                    order_increment_id = %request.order_increment_id.trim(),
                    new_status = %request.new_status.trim(),
                    "Order status updated"
                );
                (
                    "approved",
                    StatusUpdateResponse {
                        status: true,
                        message,
                    },
                )
            }
            Err(e) => {
                if matches!(e, TransitionError::TooManyRequests) {
                    self.metrics.cooldown_blocks.inc();
                }
                if e.is_business_rejection() {
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        order_increment_id = %request.order_increment_id.trim(),
                        reason = e.label(),
                        "Order status update rejected"
                    );
                } else {
                    tracing::error!(
                        correlation_id = %correlation_id,
                        order_increment_id = %request.order_increment_id.trim(),
                        reason = e.label(),
                        error = %e,
                        "Order status update failed"
                    );
                }
                (
                    e.label(),
                    StatusUpdateResponse {
                        status: false,
                        message: e.to_string(),
                    },
                )
            }
        };

        self.metrics
            .status_update_outcomes
            .with_label_values(&[outcome])
            .inc();
        self.metrics
            .status_update_duration
            .with_label_values(&[outcome])
            .observe(started.elapsed().as_secs_f64());

        vec![response]
    }

    async fn process(
        &self,
        request: &TransitionRequest,
        client_addr: &str,
        correlation_id: Uuid,
    ) -> Result<String, TransitionError> {
        if !self.config.enabled {
            return Err(TransitionError::FeatureDisabled);
        }

        let (raw_id, _) = request.trimmed();
        let increment_id = validator::parse_increment_id(raw_id)?;

        let snapshot = self.store.get_order(increment_id).await.map_err(|e| match e {
            StoreError::NotFound(id) => TransitionError::NotFound(id),
            StoreError::Unavailable(msg) => {
                tracing::error!(correlation_id = %correlation_id, error = %msg, "Order store unavailable");
                TransitionError::ServiceUnavailable
            }
        })?;

        // The window is consumed by the attempt, before validation: a request
        // that later fails a business check still burns its cooldown.
        let key = CooldownKey::new(increment_id, snapshot.store_id, client_addr);
        let proceed = self
            .guard
            .begin_attempt(&key, self.config.cooldown_lifetime())
            .await
            .map_err(|e| {
                // Never fall back to running without rate limiting.
                tracing::error!(correlation_id = %correlation_id, error = %e, "Cooldown storage unavailable");
                TransitionError::ServiceUnavailable
            })?;
        if !proceed {
            return Err(TransitionError::TooManyRequests);
        }

        let states = self.store.state_map().await.map_err(|e| {
            tracing::error!(correlation_id = %correlation_id, error = %e, "Failed to fetch status state map");
            TransitionError::ServiceUnavailable
        })?;

        let approved = validator::evaluate(&snapshot, request, &states)?;

        self.store
            .save_transition(increment_id, &approved.resolved_state, &approved.resolved_status)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(id) => TransitionError::NotFound(id),
                StoreError::Unavailable(msg) => {
                    tracing::error!(correlation_id = %correlation_id, error = %msg, "Failed to save order transition");
                    TransitionError::ServiceUnavailable
                }
            })?;

        // Post-commit side effects are independent of the response: the
        // transition is already saved, the observer only logs its failures.
        let change = StatusChange {
            order_increment_id: increment_id,
            old_status: snapshot.status.to_lowercase(),
            new_status: approved.resolved_status,
            new_state: approved.resolved_state,
            occurred_at: Utc::now(),
        };
        let observer = self.observer.clone();
        tokio::spawn(async move {
            observer.execute(&change).await;
        });

        Ok("Order status updated successfully.".to_string())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::cooldown::{CooldownError, CooldownStore, InMemoryCooldownStore};
    use crate::domain::order::{OrderSnapshot, StatusStateMap};
    use crate::observer::{InMemoryChangelog, InMemoryNotifier};
    use crate::store::InMemoryOrderStore;

    const CLIENT: &str = "10.0.0.1";

    struct Fixture {
        handler: StatusUpdateHandler,
        store: InMemoryOrderStore,
        changelog: Arc<InMemoryChangelog>,
        notifier: Arc<InMemoryNotifier>,
    }

    fn default_states() -> StatusStateMap {
        let mut map = StatusStateMap::new();
        map.insert("processing", vec!["processing".into(), "pending".into()]);
        map.insert("complete", vec!["complete".into(), "shipped".into()]);
        map
    }

    fn pending_order() -> OrderSnapshot {
        OrderSnapshot {
            increment_id: 5,
            store_id: 1,
            status: "pending".into(),
            state: "new".into(),
            total_due: 0.0,
            has_shipments: false,
            is_holdable: true,
        }
    }

    async fn fixture_with(config: ProcessingConfig) -> Fixture {
        let store = InMemoryOrderStore::new(default_states());
        store.insert(pending_order()).await;

        let changelog = Arc::new(InMemoryChangelog::new());
        let notifier = Arc::new(InMemoryNotifier::new());
        let observer = Arc::new(StatusChangeObserver::new(
            changelog.clone(),
            notifier.clone(),
        ));

        let handler = StatusUpdateHandler::new(
            Arc::new(config),
            Arc::new(store.clone()),
            CooldownGuard::new(Arc::new(InMemoryCooldownStore::new())),
            observer,
            Arc::new(Metrics::new().unwrap()),
        );

        Fixture {
            handler,
            store,
            changelog,
            notifier,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(ProcessingConfig::default()).await
    }

    /// Spawned observer tasks race the assertions; poll briefly.
    async fn wait_for_changelog(changelog: &InMemoryChangelog, len: usize) {
        for _ in 0..50 {
            if changelog.records().await.len() >= len {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("changelog never reached {} records", len);
    }

    #[tokio::test]
    async fn test_successful_update() {
        let fx = fixture().await;

        let response = fx
            .handler
            .update_order_status(TransitionRequest::new("000000005", "processing"), CLIENT)
            .await;

        assert_eq!(response.len(), 1);
        assert!(response[0].status);
        assert!(response[0].message.contains("successfully"));

        let order = fx.store.get_order(5).await.unwrap();
        assert_eq!(order.status, "processing");
        assert_eq!(order.state, "processing");

        wait_for_changelog(&fx.changelog, 1).await;
        let records = fx.changelog.records().await;
        assert_eq!(records[0].old_status, "pending");
        assert_eq!(records[0].new_status, "processing");
    }

    #[tokio::test]
    async fn test_feature_disabled_short_circuits() {
        let fx = fixture_with(ProcessingConfig::disabled()).await;

        let response = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "processing"), CLIENT)
            .await;

        assert!(!response[0].status);
        assert!(response[0].message.contains("disabled"));

        // No lookup, no mutation, no changelog.
        let order = fx.store.get_order(5).await.unwrap();
        assert_eq!(order.status, "pending");
        assert!(fx.changelog.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let fx = fixture().await;

        let response = fx
            .handler
            .update_order_status(TransitionRequest::new("99", "processing"), CLIENT)
            .await;

        assert!(!response[0].status);
        assert!(response[0].message.contains("99"));
    }

    #[tokio::test]
    async fn test_malformed_id_rejected() {
        let fx = fixture().await;

        let response = fx
            .handler
            .update_order_status(TransitionRequest::new("ORD-5", "processing"), CLIENT)
            .await;

        assert!(!response[0].status);
        assert!(response[0].message.contains("Invalid order ID"));
    }

    #[tokio::test]
    async fn test_second_request_within_cooldown_blocked() {
        let fx = fixture().await;

        let first = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "processing"), CLIENT)
            .await;
        assert!(first[0].status);

        let second = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "holded"), CLIENT)
            .await;
        assert!(!second[0].status);
        assert!(second[0].message.contains("too many requests"));
    }

    #[tokio::test]
    async fn test_rejected_attempt_still_burns_cooldown() {
        let fx = fixture().await;

        // No-op rejection...
        let first = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "pending"), CLIENT)
            .await;
        assert!(first[0].message.contains("same"));

        // ...still consumed the window for this key.
        let second = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "processing"), CLIENT)
            .await;
        assert!(!second[0].status);
        assert!(second[0].message.contains("too many requests"));
    }

    #[tokio::test]
    async fn test_different_clients_have_independent_windows() {
        let fx = fixture().await;

        let first = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "processing"), "10.0.0.1")
            .await;
        assert!(first[0].status);

        let second = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "holded"), "10.0.0.2")
            .await;
        assert!(second[0].status);
    }

    #[tokio::test]
    async fn test_zero_lifetime_disables_cooldown() {
        let config = ProcessingConfig {
            cooldown_lifetime_secs: 0,
            ..ProcessingConfig::default()
        };
        let fx = fixture_with(config).await;

        let first = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "processing"), CLIENT)
            .await;
        assert!(first[0].status);

        let second = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "holded"), CLIENT)
            .await;
        assert!(second[0].status);
    }

    #[tokio::test]
    async fn test_shipped_update_notifies_customer() {
        let fx = fixture().await;
        fx.store.set_has_shipments(5, true).await;

        let response = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "shipped"), CLIENT)
            .await;
        assert!(response[0].status);

        wait_for_changelog(&fx.changelog, 1).await;
        for _ in 0..50 {
            if !fx.notifier.notifications().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let notifications = fx.notifier.notifications().await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].order_increment_id, 5);
    }

    #[tokio::test]
    async fn test_business_rejection_leaves_order_untouched() {
        let fx = fixture().await;

        let response = fx
            .handler
            .update_order_status(TransitionRequest::new("5", "shipped"), CLIENT)
            .await;
        assert!(!response[0].status);
        assert!(response[0].message.contains("shipment"));

        let order = fx.store.get_order(5).await.unwrap();
        assert_eq!(order.status, "pending");
        assert!(fx.changelog.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_cooldown_outage_is_a_hard_stop() {
        struct DownCooldownStore;

        #[async_trait]
        impl CooldownStore for DownCooldownStore {
            async fn insert_if_absent(
                &self,
                _key: &str,
                _ttl: Duration,
            ) -> Result<bool, CooldownError> {
                Err(CooldownError::Unavailable("connection refused".into()))
            }

            async fn contains(&self, _key: &str) -> Result<bool, CooldownError> {
                Err(CooldownError::Unavailable("connection refused".into()))
            }
        }

        let store = InMemoryOrderStore::new(default_states());
        store.insert(pending_order()).await;
        let observer = Arc::new(StatusChangeObserver::new(
            Arc::new(InMemoryChangelog::new()),
            Arc::new(InMemoryNotifier::new()),
        ));
        let handler = StatusUpdateHandler::new(
            Arc::new(ProcessingConfig::default()),
            Arc::new(store.clone()),
            CooldownGuard::new(Arc::new(DownCooldownStore)),
            observer,
            Arc::new(Metrics::new().unwrap()),
        );

        let response = handler
            .update_order_status(TransitionRequest::new("5", "processing"), CLIENT)
            .await;

        // Rate limiting never degrades silently: the request is refused.
        assert!(!response[0].status);
        assert!(response[0].message.contains("unavailable"));
        let order = store.get_order(5).await.unwrap();
        assert_eq!(order.status, "pending");
    }

    #[tokio::test]
    async fn test_trimmed_fields_are_used() {
        let fx = fixture().await;

        let response = fx
            .handler
            .update_order_status(
                TransitionRequest::new("  000000005  ", "  processing "),
                CLIENT,
            )
            .await;

        assert!(response[0].status);
        let order = fx.store.get_order(5).await.unwrap();
        assert_eq!(order.status, "processing");
    }
}
