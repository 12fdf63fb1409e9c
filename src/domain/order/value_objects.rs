use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Order Value Objects
// ============================================================================

/// One line of an order, snapshotted from the cart at submission time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub name: String,
    pub price: f64,
    pub qty: u32,
}

/// Lifecycle states of an order in the shared snapshot.
///
/// `Active` orders await handling. `Processing` is a non-terminal
/// intermediate state set by the counter. `Completed` and `Cancelled` are
/// terminal for the active list: an order reaching them is removed and
/// archived by whichever side terminated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Active,
    Processing,
    Completed,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Active => "active",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Delivery,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_uses_the_persisted_lowercase_encoding() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );

        let parsed: OrderStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, OrderStatus::Completed);
    }

    #[test]
    fn test_order_type_encoding() {
        assert_eq!(
            serde_json::to_string(&OrderType::DineIn).unwrap(),
            "\"dine_in\""
        );
        let parsed: OrderType = serde_json::from_str("\"delivery\"").unwrap();
        assert_eq!(parsed, OrderType::Delivery);
    }
}
