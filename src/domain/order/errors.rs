// ============================================================================
// Order Status Transition Errors
// ============================================================================

/// Every way a status-update attempt can be turned down.
///
/// Messages are the human-readable sentences returned to the caller; the
/// transport renders them verbatim inside `{status: false, message}`.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("This functionality is disabled, please contact us.")]
    FeatureDisabled,

    #[error("Invalid order ID format, please provide a valid order id.")]
    InvalidInput,

    #[error("Order does not exist with order id {0}.")]
    NotFound(u64),

    #[error("We have received too many requests for this order status change. Please wait for some time.")]
    TooManyRequests,

    #[error("Current order status and new order status are the same, please modify the status.")]
    NoOpTransition,

    #[error("Status of a completed or canceled order is not allowed to be changed.")]
    TerminalState,

    #[error("Order is currently on hold, status change not allowed.")]
    OnHold,

    #[error("Order cannot be complete. Payment is still due.")]
    PaymentDue,

    #[error("Order cannot be marked as shipped until a shipment is generated.")]
    NoShipment,

    #[error("Please provide a valid order id and order status.")]
    MissingFields,

    #[error("Service temporarily unavailable, please try again later.")]
    ServiceUnavailable,

    #[error("Unexpected failure: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl TransitionError {
    /// Stable snake_case tag used as a metric label and log field.
    pub fn label(&self) -> &'static str {
        match self {
            TransitionError::FeatureDisabled => "feature_disabled",
            TransitionError::InvalidInput => "invalid_input",
            TransitionError::NotFound(_) => "not_found",
            TransitionError::TooManyRequests => "too_many_requests",
            TransitionError::NoOpTransition => "no_op_transition",
            TransitionError::TerminalState => "terminal_state",
            TransitionError::OnHold => "on_hold",
            TransitionError::PaymentDue => "payment_due",
            TransitionError::NoShipment => "no_shipment",
            TransitionError::MissingFields => "missing_fields",
            TransitionError::ServiceUnavailable => "service_unavailable",
            TransitionError::Unexpected(_) => "unexpected",
        }
    }

    /// Business-rule rejections log at WARN; infrastructure failures at ERROR.
    pub fn is_business_rejection(&self) -> bool {
        !matches!(
            self,
            TransitionError::ServiceUnavailable | TransitionError::Unexpected(_)
        )
    }
}
