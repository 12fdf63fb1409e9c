use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::ClientId;

use super::draft::OrderDraft;
use super::errors::OrderError;
use super::value_objects::{OrderItem, OrderStatus, OrderType};

// ============================================================================
// Order Record
// ============================================================================
//
// Built once by the validation gate and persisted as part of the shared
// snapshot. Ownership is stamped at creation and never changes; the total
// always equals the sum over the item lines because it is computed here
// and nowhere else.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub customer_name: String,
    pub party_size: Option<u32>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub table: Option<String>,
    pub order_type: OrderType,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub owner_id: ClientId,
    pub cancelled_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

fn is_blank(field: &Option<String>) -> bool {
    field
        .as_deref()
        .map(|value| value.trim().is_empty())
        .unwrap_or(true)
}

impl Order {
    /// The single validation gate: no order is constructed, let alone
    /// persisted, unless every precondition for its type holds.
    pub fn place(
        items: Vec<OrderItem>,
        draft: OrderDraft,
        owner: &ClientId,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        if draft.customer_name.trim().is_empty() {
            return Err(OrderError::MissingName);
        }

        match draft.order_type {
            OrderType::Delivery => {
                if is_blank(&draft.address) || is_blank(&draft.phone) {
                    return Err(OrderError::MissingDeliveryInfo);
                }
            }
            OrderType::DineIn => {
                if draft.party_size.is_none()
                    || draft.date.is_none()
                    || draft.time.is_none()
                    || is_blank(&draft.table)
                {
                    return Err(OrderError::MissingReservationInfo);
                }
            }
        }

        let total = items
            .iter()
            .map(|item| item.price * f64::from(item.qty))
            .sum();
        let now = Utc::now();

        Ok(Self {
            // Millisecond timestamps collide with acceptably low
            // probability for a per-store order stream.
            id: format!("ORD{}", now.timestamp_millis()),
            items,
            total,
            customer_name: draft.customer_name,
            party_size: draft.party_size,
            date: draft.date,
            time: draft.time,
            table: draft.table,
            order_type: draft.order_type,
            address: draft.address,
            phone: draft.phone,
            created_at: now,
            status: OrderStatus::Active,
            owner_id: owner.clone(),
            cancelled_reason: None,
            cancelled_at: None,
        })
    }

    /// Archive key: the creation day at UTC granularity.
    pub fn created_day(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
