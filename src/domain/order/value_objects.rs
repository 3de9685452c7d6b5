use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Order Value Objects
// ============================================================================

/// Statuses that can never be transitioned away from.
pub const RESTRICTED_STATUSES: [&str; 2] = ["complete", "canceled"];

/// Status that requires a shipment to exist before it can be applied, and
/// triggers the customer notification hook once committed.
pub const STATUS_SHIPPED: &str = "shipped";

/// Status that requires the order to be fully paid before it can be applied.
pub const STATUS_COMPLETE: &str = "complete";

/// Read-only view of one order, taken for a single evaluation.
///
/// Snapshots are built fresh per call by the order store and discarded after
/// the evaluation. `status` is lowercase-normalized; `state` is the current
/// lifecycle state and serves as the fallback of state resolution.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderSnapshot {
    pub increment_id: u64,
    pub store_id: u32,
    pub status: String,
    pub state: String,
    pub total_due: f64,
    pub has_shipments: bool,
    pub is_holdable: bool,
}

/// Raw status-change request as it arrives off the wire.
///
/// Both fields are free-form strings; they are trimmed before use and an
/// empty-after-trim value counts as missing.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TransitionRequest {
    pub order_increment_id: String,
    pub new_status: String,
}

impl TransitionRequest {
    pub fn new(order_increment_id: impl Into<String>, new_status: impl Into<String>) -> Self {
        Self {
            order_increment_id: order_increment_id.into(),
            new_status: new_status.into(),
        }
    }

    /// Trimmed view of both fields.
    pub fn trimmed(&self) -> (&str, &str) {
        (self.order_increment_id.trim(), self.new_status.trim())
    }
}

/// Mapping from lifecycle state to the statuses that belong to it.
///
/// Owned by the surrounding order platform and supplied fresh per evaluation;
/// the validator only consults it. Iteration follows insertion order, and in a
/// well-formed map every status belongs to at most one state.
#[derive(Clone, Debug, Default)]
pub struct StatusStateMap {
    entries: Vec<(String, Vec<String>)>,
}

impl StatusStateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: impl Into<String>, statuses: Vec<String>) {
        self.entries.push((state.into(), statuses));
    }

    /// First state whose status set contains `status` (case-sensitive exact
    /// match), or `None` when the status is mapped nowhere.
    pub fn resolve(&self, status: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, statuses)| statuses.iter().any(|s| s == status))
            .map(|(state, _)| state.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A committed status change, handed to the observer after the save.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StatusChange {
    pub order_increment_id: u64,
    pub old_status: String,
    pub new_status: String,
    pub new_state: String,
    pub occurred_at: DateTime<Utc>,
}

// ============================================================================
// Unit Tests
// ============================================================================
