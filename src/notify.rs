use std::fmt;

use crate::domain::order::OrderStatus;

// ============================================================================
// Notification Router
// ============================================================================
//
// Decides, per status transition and per ownership, whether and what to
// tell the current client. The routing predicate is pure; delivery goes
// through the `Notifier` seam so the display mechanism stays a UI
// collaborator.
//
// ============================================================================

/// True iff the transition is worth interrupting the user for: the status
/// actually changed and landed on a terminal outcome. `Processing` is
/// deliberately suppressed as low-value noise.
pub fn should_notify(previous: OrderStatus, new: OrderStatus) -> bool {
    new != previous && matches!(new, OrderStatus::Completed | OrderStatus::Cancelled)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// Submission succeeded in this context.
    Placed { order_id: String },
    /// A snapshot diff surfaced a terminal transition.
    StatusChanged {
        order_id: String,
        status: OrderStatus,
    },
    /// Targeted signal: this client's order was completed.
    Completed { order_id: String },
    /// Targeted signal: this client's order was cancelled. Carries the
    /// reason; completion does not.
    Cancelled {
        order_id: String,
        reason: Option<String>,
    },
    /// Local cancellation went through.
    CancelAcknowledged { order_id: String },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Placed { order_id } => {
                write!(f, "Order {order_id} placed successfully")
            }
            Notification::StatusChanged { order_id, status } => {
                write!(f, "Order {order_id} has been updated: {status}")
            }
            Notification::Completed { order_id } => {
                write!(f, "Order {order_id} has been completed")
            }
            Notification::Cancelled { order_id, reason } => {
                let reason = reason.as_deref().unwrap_or("no reason given");
                write!(f, "Order {order_id} was cancelled. Reason: {reason}")
            }
            Notification::CancelAcknowledged { order_id } => {
                write!(f, "Order {order_id} cancelled")
            }
        }
    }
}

// ============================================================================
// User Interaction Seams
// ============================================================================

/// Abstract "notify user". The rendering collaborator owns the display
/// mechanism; the core only decides when to call this.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Abstract "confirm intent" asked before committing a cancellation.
pub trait CancelPrompt: Send + Sync {
    fn confirm_cancel(&self, order_id: &str) -> bool;
}

/// Notifier for the demo binary: renders through the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!("🔔 {notification}");
    }
}

/// Prompt for the demo binary: accepts every cancellation.
pub struct AutoConfirm;

impl CancelPrompt for AutoConfirm {
    fn confirm_cancel(&self, order_id: &str) -> bool {
        tracing::debug!(order_id = %order_id, "auto-confirming cancellation");
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_transitions_notify() {
        assert!(should_notify(OrderStatus::Active, OrderStatus::Completed));
        assert!(should_notify(OrderStatus::Active, OrderStatus::Cancelled));
        assert!(should_notify(OrderStatus::Processing, OrderStatus::Completed));
    }

    #[test]
    fn test_processing_is_suppressed() {
        assert!(!should_notify(OrderStatus::Active, OrderStatus::Processing));
    }

    #[test]
    fn test_unchanged_status_never_notifies() {
        assert!(!should_notify(OrderStatus::Completed, OrderStatus::Completed));
        assert!(!should_notify(OrderStatus::Cancelled, OrderStatus::Cancelled));
        assert!(!should_notify(OrderStatus::Active, OrderStatus::Active));
    }

    #[test]
    fn test_cancellation_message_includes_the_reason() {
        let with_reason = Notification::Cancelled {
            order_id: "ORD1".to_string(),
            reason: Some("out of stock".to_string()),
        };
        assert_eq!(
            with_reason.to_string(),
            "Order ORD1 was cancelled. Reason: out of stock"
        );

        let without_reason = Notification::Cancelled {
            order_id: "ORD1".to_string(),
            reason: None,
        };
        assert_eq!(
            without_reason.to_string(),
            "Order ORD1 was cancelled. Reason: no reason given"
        );
    }
}
