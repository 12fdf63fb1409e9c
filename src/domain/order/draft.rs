use chrono::{NaiveDate, NaiveTime};

use super::value_objects::OrderType;

// ============================================================================
// Order Draft
// ============================================================================
//
// Structured form fields handed over by the UI collaborator. Which fields
// are required depends on the order type; `Order::place` is the single
// gate that checks them.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct OrderDraft {
    pub customer_name: String,
    pub order_type: OrderType,
    pub party_size: Option<u32>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub table: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl OrderDraft {
    /// Minimal dine-in draft; reservation fields filled in by the caller.
    pub fn dine_in(customer_name: &str) -> Self {
        Self {
            customer_name: customer_name.to_string(),
            order_type: OrderType::DineIn,
            party_size: None,
            date: None,
            time: None,
            table: None,
            address: None,
            phone: None,
        }
    }

    /// Minimal delivery draft; contact fields filled in by the caller.
    pub fn delivery(customer_name: &str) -> Self {
        Self {
            customer_name: customer_name.to_string(),
            order_type: OrderType::Delivery,
            party_size: None,
            date: None,
            time: None,
            table: None,
            address: None,
            phone: None,
        }
    }
}
