use super::errors::TransitionError;
use super::value_objects::{
    OrderSnapshot, StatusStateMap, TransitionRequest, RESTRICTED_STATUSES, STATUS_COMPLETE,
    STATUS_SHIPPED,
};

// ============================================================================
// Transition Validator - Pure Decision Procedure
// ============================================================================
//
// Given one order snapshot and one requested status, decide whether the
// transition is allowed and which lifecycle state it lands in. No side
// effects; the first failing check determines the rejection, and the check
// order is part of the observable contract.
//
// ============================================================================

/// An approved transition, ready to be persisted by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedTransition {
    pub resolved_state: String,
    pub resolved_status: String,
}

/// Parse an order increment id.
///
/// Increment ids are positive integer-like tokens, possibly zero-padded
/// ("000000005" is order 5). Anything else is malformed input.
pub fn parse_increment_id(raw: &str) -> Result<u64, TransitionError> {
    let id: u64 = raw.parse().map_err(|_| TransitionError::InvalidInput)?;
    if id == 0 {
        return Err(TransitionError::InvalidInput);
    }
    Ok(id)
}

/// Evaluate one requested status change against the order snapshot.
///
/// Checks run in a fixed sequence; the first failure wins:
/// 1. increment id must be a positive integer token
/// 2. requested status must differ from the current one (case-insensitive)
/// 3. completed or canceled orders never change again
/// 4. orders on hold are blocked
/// 5. "complete" requires the order to be fully paid
/// 6. "shipped" requires a shipment to exist
/// 7. both request fields must be non-empty (tail guard around the mutation)
///
/// Existence is the order store's concern and surfaces as `NotFound` before
/// this runs.
pub fn evaluate(
    snapshot: &OrderSnapshot,
    request: &TransitionRequest,
    states: &StatusStateMap,
) -> Result<ApprovedTransition, TransitionError> {
    let (raw_id, new_status) = request.trimmed();

    parse_increment_id(raw_id)?;

    let current_status = snapshot.status.to_lowercase();

    if new_status.eq_ignore_ascii_case(&current_status) {
        return Err(TransitionError::NoOpTransition);
    }

    if RESTRICTED_STATUSES.contains(&current_status.as_str()) {
        return Err(TransitionError::TerminalState);
    }

    if !snapshot.is_holdable {
        return Err(TransitionError::OnHold);
    }

    if new_status == STATUS_COMPLETE && snapshot.total_due > 0.0 {
        return Err(TransitionError::PaymentDue);
    }

    if new_status == STATUS_SHIPPED && !snapshot.has_shipments {
        return Err(TransitionError::NoShipment);
    }

    if raw_id.is_empty() || new_status.is_empty() {
        return Err(TransitionError::MissingFields);
    }

    Ok(ApprovedTransition {
        resolved_state: resolve_state(snapshot, new_status, states),
        resolved_status: new_status.to_string(),
    })
}

/// Lifecycle state the requested status belongs to, falling back to the
/// order's current state when the map does not know the status.
fn resolve_state(snapshot: &OrderSnapshot, status: &str, states: &StatusStateMap) -> String {
    states
        .resolve(status)
        .unwrap_or(snapshot.state.as_str())
        .to_string()
}

// ============================================================================
// Unit Tests
// ============================================================================
