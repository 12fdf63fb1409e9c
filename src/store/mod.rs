// ============================================================================
// Shared Store - External Key-Value Collaborator
// ============================================================================
//
// The persisted store is an external service from the client's point of
// view: a synchronous key-value surface plus a change-notification fan-out
// that reaches every open context except the writer.
//
// Structure:
// - mod.rs    - key names, wire types, snapshot codec
// - memory.rs - in-memory implementation with subscriber fan-out
//
// ============================================================================

use actix::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::order::{Order, OrderStatus};
use crate::identity::ClientId;

mod memory;

pub use memory::{SharedStore, SubscriberId};

// ============================================================================
// Store Keys
// ============================================================================

/// Per-installation identity, written once.
pub const CLIENT_ID_KEY: &str = "client_id_v1";

/// Active-order snapshot: JSON array, full overwrite on every write.
pub const ORDERS_KEY: &str = "orders_v1";

/// Terminated orders keyed by creation day (`%Y-%m-%d`), append-only per key.
pub const ARCHIVE_KEY: &str = "orders_archive_v1";

/// Single-slot change-event signal. Only the latest value is retained;
/// fast successive updates may overwrite before being observed.
pub const LAST_UPDATE_KEY: &str = "last_order_update_v1";

// ============================================================================
// Change Notification
// ============================================================================

/// Delivered to every subscribed context except the writer when a key
/// changes. Mirrors the storage-event contract: old and new value travel
/// with the key, and a writer never observes its own write.
#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub struct StoreChanged {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

// ============================================================================
// Change-Event Signal
// ============================================================================

/// Point-to-point signal published alongside a status change, independent
/// of the snapshot. Targeted at the order's owner; contexts with a
/// different identity discard it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderUpdateSignal {
    pub id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub owner_id: Option<ClientId>,
    pub ts: i64,
}

// ============================================================================
// Snapshot Codec
// ============================================================================

pub fn encode_snapshot(orders: &[Order]) -> Result<String, serde_json::Error> {
    serde_json::to_string(orders)
}

pub fn decode_snapshot(raw: &str) -> Result<Vec<Order>, serde_json::Error> {
    serde_json::from_str(raw)
}
