use chrono::Utc;
use std::collections::BTreeMap;

use crate::identity::ClientId;
use crate::store::{
    decode_snapshot, encode_snapshot, OrderUpdateSignal, SharedStore, SubscriberId, ARCHIVE_KEY,
    LAST_UPDATE_KEY, ORDERS_KEY,
};

use super::draft::OrderDraft;
use super::errors::OrderError;
use super::order::Order;
use super::value_objects::{OrderItem, OrderStatus};

// ============================================================================
// Order Repository
// ============================================================================
//
// Owns this context's copy of the active-order snapshot and every write
// this context makes to the shared store. The local list doubles as the
// sync engine's baseline: persisting and refreshing the baseline are the
// same step, and the store never echoes a write back to its writer.
//
// Writes are full-snapshot overwrites. Two installations writing
// concurrently race at snapshot granularity and the later write wins;
// there is no merge.
//
// ============================================================================

pub const CANCELLED_BY_CUSTOMER: &str = "cancelled by customer";

type Archive = BTreeMap<String, Vec<Order>>;

pub struct OrderRepository {
    store: SharedStore,
    writer: SubscriberId,
    client_id: ClientId,
    orders: Vec<Order>,
}

impl OrderRepository {
    /// Load the persisted snapshot. A missing or malformed stored value
    /// yields an empty list; refusing to boot over a corrupt snapshot
    /// would take the whole context down with it.
    pub fn load(store: SharedStore, writer: SubscriberId, client_id: ClientId) -> Self {
        let orders = match store.get(ORDERS_KEY) {
            Some(raw) => match decode_snapshot(&raw) {
                Ok(orders) => orders,
                Err(error) => {
                    tracing::warn!(%error, "stored order snapshot is malformed, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        tracing::debug!(order_count = orders.len(), "order repository loaded");

        Self {
            store,
            writer,
            client_id,
            orders,
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Ownership-scoped view: this client's active orders, newest first.
    pub fn visible_orders(&self) -> Vec<Order> {
        let mut visible: Vec<Order> = self
            .orders
            .iter()
            .filter(|order| {
                order.status == OrderStatus::Active && order.owner_id == self.client_id
            })
            .cloned()
            .collect();
        visible.reverse();
        visible
    }

    /// Validate, append and persist a new order. The caller clears the
    /// cart only after this returns Ok.
    pub fn submit(&mut self, items: Vec<OrderItem>, draft: OrderDraft) -> Result<Order, OrderError> {
        let order = Order::place(items, draft, &self.client_id)?;

        tracing::info!(
            order_id = %order.id,
            total = order.total,
            order_type = ?order.order_type,
            "order submitted"
        );

        self.orders.push(order.clone());
        self.persist()?;
        Ok(order)
    }

    /// Cancel one of the active orders: stamp the cancellation, move the
    /// record into the archive under its creation day, publish the
    /// targeted change-event signal, drop it from the snapshot, persist.
    ///
    /// Cancelling an order that already went through this path reports
    /// `AlreadyCancelled` and leaves the archive untouched.
    pub fn cancel(&mut self, order_id: &str) -> Result<Order, OrderError> {
        let Some(index) = self.orders.iter().position(|order| order.id == order_id) else {
            if self.is_archived_cancelled(order_id) {
                return Err(OrderError::AlreadyCancelled(order_id.to_string()));
            }
            return Err(OrderError::NotFound(order_id.to_string()));
        };

        if self.orders[index].status == OrderStatus::Cancelled {
            return Err(OrderError::AlreadyCancelled(order_id.to_string()));
        }

        let mut order = self.orders.remove(index);
        order.status = OrderStatus::Cancelled;
        order.cancelled_reason = Some(CANCELLED_BY_CUSTOMER.to_string());
        order.cancelled_at = Some(Utc::now());

        self.append_archive(&order)?;
        self.publish_update(&order)?;
        self.persist()?;

        tracing::info!(order_id = %order.id, "order cancelled and archived");
        Ok(order)
    }

    /// Full-snapshot overwrite of the orders key.
    pub fn persist(&mut self) -> Result<(), OrderError> {
        let raw = encode_snapshot(&self.orders)?;
        self.store.set(ORDERS_KEY, &raw, self.writer);
        Ok(())
    }

    /// Adopt an externally observed snapshot as the new baseline.
    pub fn replace(&mut self, observed: Vec<Order>) {
        self.orders = observed;
    }

    fn read_archive(&self) -> Archive {
        self.store
            .get(ARCHIVE_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn is_archived_cancelled(&self, order_id: &str) -> bool {
        self.read_archive().values().flatten().any(|order| {
            order.id == order_id && order.status == OrderStatus::Cancelled
        })
    }

    // Append-only per day key; an order is written here exactly once, at
    // the moment it leaves the active snapshot.
    fn append_archive(&self, order: &Order) -> Result<(), OrderError> {
        let mut archive = self.read_archive();
        archive
            .entry(order.created_day())
            .or_default()
            .push(order.clone());
        self.store
            .set(ARCHIVE_KEY, &serde_json::to_string(&archive)?, self.writer);
        Ok(())
    }

    fn publish_update(&self, order: &Order) -> Result<(), OrderError> {
        let signal = OrderUpdateSignal {
            id: order.id.clone(),
            status: order.status,
            reason: order.cancelled_reason.clone(),
            owner_id: Some(order.owner_id.clone()),
            ts: Utc::now().timestamp_millis(),
        };
        self.store.set(
            LAST_UPDATE_KEY,
            &serde_json::to_string(&signal)?,
            self.writer,
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn dine_in_draft() -> OrderDraft {
        let mut draft = OrderDraft::dine_in("An");
        draft.party_size = Some(2);
        draft.date = NaiveDate::from_ymd_opt(2026, 8, 7);
        draft.time = NaiveTime::from_hms_opt(19, 30, 0);
        draft.table = Some("T1".to_string());
        draft
    }

    fn pho(qty: u32) -> Vec<OrderItem> {
        vec![OrderItem {
            name: "Pho".to_string(),
            price: 5.0,
            qty,
        }]
    }

    fn fresh_repo() -> (SharedStore, OrderRepository) {
        let store = SharedStore::new();
        let writer = store.register();
        let repo = OrderRepository::load(store.clone(), writer, ClientId::from("C1"));
        (store, repo)
    }

    #[test]
    fn test_submit_appends_and_persists_the_snapshot() {
        let (store, mut repo) = fresh_repo();

        let order = repo.submit(pho(2), dine_in_draft()).unwrap();

        assert_eq!(repo.orders().len(), 1);
        let persisted = decode_snapshot(&store.get(ORDERS_KEY).unwrap()).unwrap();
        assert_eq!(persisted, vec![order]);
    }

    #[test]
    fn test_failed_validation_persists_nothing() {
        let (store, mut repo) = fresh_repo();

        let result = repo.submit(vec![], dine_in_draft());
        assert!(matches!(result, Err(OrderError::EmptyCart)));

        assert!(repo.orders().is_empty());
        assert_eq!(store.get(ORDERS_KEY), None);
    }

    #[test]
    fn test_cancel_archives_and_publishes_the_targeted_signal() {
        let (store, mut repo) = fresh_repo();
        let order = repo.submit(pho(2), dine_in_draft()).unwrap();

        let cancelled = repo.cancel(&order.id).unwrap();

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancelled_reason.as_deref(), Some(CANCELLED_BY_CUSTOMER));
        assert!(cancelled.cancelled_at.is_some());
        assert!(repo.orders().is_empty());

        // Removed from the persisted snapshot.
        let persisted = decode_snapshot(&store.get(ORDERS_KEY).unwrap()).unwrap();
        assert!(persisted.is_empty());

        // Archived under the creation day.
        let archive: Archive = serde_json::from_str(&store.get(ARCHIVE_KEY).unwrap()).unwrap();
        let day_entries = archive.get(&cancelled.created_day()).unwrap();
        assert_eq!(day_entries.len(), 1);
        assert_eq!(day_entries[0].id, order.id);

        // Signal addressed to the owner, carrying the reason.
        let signal: OrderUpdateSignal =
            serde_json::from_str(&store.get(LAST_UPDATE_KEY).unwrap()).unwrap();
        assert_eq!(signal.id, order.id);
        assert_eq!(signal.status, OrderStatus::Cancelled);
        assert_eq!(signal.reason.as_deref(), Some(CANCELLED_BY_CUSTOMER));
        assert_eq!(signal.owner_id, Some(ClientId::from("C1")));
    }

    #[test]
    fn test_double_cancel_reports_already_cancelled_without_duplicate_archive() {
        let (store, mut repo) = fresh_repo();
        let order = repo.submit(pho(1), dine_in_draft()).unwrap();

        repo.cancel(&order.id).unwrap();
        let second = repo.cancel(&order.id);
        assert!(matches!(second, Err(OrderError::AlreadyCancelled(_))));

        let archive: Archive = serde_json::from_str(&store.get(ARCHIVE_KEY).unwrap()).unwrap();
        let total_entries: usize = archive.values().map(Vec::len).sum();
        assert_eq!(total_entries, 1);
    }

    #[test]
    fn test_cancel_unknown_order_reports_not_found() {
        let (_store, mut repo) = fresh_repo();
        let result = repo.cancel("ORD0");
        assert!(matches!(result, Err(OrderError::NotFound(_))));
    }

    #[test]
    fn test_visible_orders_are_ownership_scoped_and_newest_first() {
        let (_store, mut repo) = fresh_repo();

        let mut mine_old = Order::place(pho(1), dine_in_draft(), &ClientId::from("C1")).unwrap();
        mine_old.id = "ORD1".to_string();
        let mut mine_new = mine_old.clone();
        mine_new.id = "ORD2".to_string();
        let mut foreign = mine_old.clone();
        foreign.id = "ORD3".to_string();
        foreign.owner_id = ClientId::from("C2");
        let mut processing = mine_old.clone();
        processing.id = "ORD4".to_string();
        processing.status = OrderStatus::Processing;

        repo.replace(vec![mine_old, mine_new, foreign, processing]);

        let visible = repo.visible_orders();
        let ids: Vec<&str> = visible.iter().map(|order| order.id.as_str()).collect();
        assert_eq!(ids, vec!["ORD2", "ORD1"]);
    }

    #[test]
    fn test_load_tolerates_a_malformed_stored_snapshot() {
        let store = SharedStore::new();
        let writer = store.register();
        store.set(ORDERS_KEY, "not json", writer);

        let repo = OrderRepository::load(store, writer, ClientId::from("C1"));
        assert!(repo.orders().is_empty());
    }
}
