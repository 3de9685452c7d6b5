use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ChangelogSink, NotificationSink, StatusChangeRecord};
use crate::domain::order::StatusChange;

// ============================================================================
// In-Memory Sinks
// ============================================================================
//
// Back the demo binary and the tests. The real changelog table and the mail
// transport live in the surrounding platform.
//
// ============================================================================

#[derive(Clone, Default)]
pub struct InMemoryChangelog {
    records: Arc<Mutex<Vec<StatusChangeRecord>>>,
}

impl InMemoryChangelog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<StatusChangeRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl ChangelogSink for InMemoryChangelog {
    async fn append(&self, record: StatusChangeRecord) -> anyhow::Result<()> {
        tracing::debug!(
            order_increment_id = record.order_increment_id,
            old_status = %record.old_status,
            new_status = %record.new_status,
            "Changelog entry appended"
        );
        self.records.lock().await.push(record);
        Ok(())
    }
}

/// Notification captured by [`InMemoryNotifier`].
#[derive(Clone, Debug)]
pub struct CapturedNotification {
    pub order_increment_id: u64,
    pub comment: String,
}

#[derive(Clone, Default)]
pub struct InMemoryNotifier {
    notifications: Arc<Mutex<Vec<CapturedNotification>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notifications(&self) -> Vec<CapturedNotification> {
        self.notifications.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotifier {
    async fn notify_shipped(&self, change: &StatusChange, comment: &str) -> anyhow::Result<()> {
        tracing::debug!(
            order_increment_id = change.order_increment_id,
            new_state = %change.new_state,
            "Shipment notification sent"
        );
        self.notifications.lock().await.push(CapturedNotification {
            order_increment_id: change.order_increment_id,
            comment: comment.to_string(),
        });
        Ok(())
    }
}
