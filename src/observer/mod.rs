mod sinks;

pub use sinks::{CapturedNotification, InMemoryChangelog, InMemoryNotifier};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order::{StatusChange, STATUS_SHIPPED};

// ============================================================================
// Status Change Observer - Post-Commit Hook
// ============================================================================
//
// Runs after a transition is persisted: every change is appended to the
// changelog, and a change to "shipped" additionally notifies the customer
// with a history comment. Both sinks are best-effort; the status change is
// already committed, so sink failures are logged and swallowed.
//
// ============================================================================

/// One row for the changelog sink.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StatusChangeRecord {
    pub order_increment_id: u64,
    pub old_status: String,
    pub new_status: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait ChangelogSink: Send + Sync {
    async fn append(&self, record: StatusChangeRecord) -> anyhow::Result<()>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Append an order-history comment and send the customer notification.
    async fn notify_shipped(&self, change: &StatusChange, comment: &str) -> anyhow::Result<()>;
}

pub struct StatusChangeObserver {
    changelog: Arc<dyn ChangelogSink>,
    notifier: Arc<dyn NotificationSink>,
}

impl StatusChangeObserver {
    pub fn new(changelog: Arc<dyn ChangelogSink>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { changelog, notifier }
    }

    pub async fn execute(&self, change: &StatusChange) {
        let record = StatusChangeRecord {
            order_increment_id: change.order_increment_id,
            old_status: change.old_status.clone(),
            new_status: change.new_status.clone(),
            created_at: change.occurred_at,
        };

        if let Err(e) = self.changelog.append(record).await {
            tracing::error!(
                order_increment_id = change.order_increment_id,
                error = %e,
                "Failed to append status changelog entry"
            );
        }

        if change.new_status == STATUS_SHIPPED {
            let comment = format!(
                "Order status changed programmatically to {}",
                change.new_status
            );

            match self.notifier.notify_shipped(change, &comment).await {
                Ok(()) => {
                    tracing::info!(
                        order_increment_id = change.order_increment_id,
                        "Customer notified for order shipment"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        order_increment_id = change.order_increment_id,
                        error = %e,
                        "Failed to notify customer of shipment"
                    );
                }
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
