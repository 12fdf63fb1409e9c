// ============================================================================
// Order Errors
// ============================================================================
//
// Validation errors block order creation and are surfaced to the user;
// cancellation errors are recovered locally as no-ops with feedback.
// None of them is fatal to the context.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("customer name is required")]
    MissingName,

    #[error("delivery orders require an address and a phone number")]
    MissingDeliveryInfo,

    #[error("dine-in orders require party size, date, time and table")]
    MissingReservationInfo,

    #[error("order {0} not found")]
    NotFound(String),

    #[error("order {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("failed to encode order state: {0}")]
    Encode(#[from] serde_json::Error),
}
