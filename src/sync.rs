use std::collections::HashMap;

use crate::domain::order::{Order, OrderStatus};
use crate::identity::ClientId;
use crate::notify::{should_notify, Notification};
use crate::store::OrderUpdateSignal;

// ============================================================================
// Sync Engine
// ============================================================================
//
// Reconciles this context's order list against snapshots and change-event
// signals observed from other contexts. Both entry points are pure
// decisions over inputs; the owning actor feeds them store changes and
// delivers whatever notifications come back.
//
// The latest observed snapshot is always authoritative: the caller
// replaces its baseline with it regardless of the notification outcome.
//
// ============================================================================

pub struct SyncEngine {
    client_id: ClientId,
}

impl SyncEngine {
    pub fn new(client_id: ClientId) -> Self {
        Self { client_id }
    }

    /// Diff the previously-known snapshot against a newly-observed one,
    /// keyed by order id, and collect the transitions worth surfacing.
    ///
    /// Orders present before but absent now were archived or processed by
    /// the counter; they stay silent by documented policy, not oversight.
    /// Orders never seen before carry no transition and stay silent too.
    pub fn diff(&self, previous: &[Order], observed: &[Order]) -> Vec<Notification> {
        let previous_by_id: HashMap<&str, &Order> = previous
            .iter()
            .map(|order| (order.id.as_str(), order))
            .collect();

        let mut notifications = Vec::new();

        for order in observed {
            let Some(known) = previous_by_id.get(order.id.as_str()) else {
                continue;
            };

            if known.status == order.status {
                continue;
            }

            if should_notify(known.status, order.status) {
                notifications.push(Notification::StatusChanged {
                    order_id: order.id.clone(),
                    status: order.status,
                });
            } else {
                tracing::debug!(
                    order_id = %order.id,
                    from = %known.status,
                    to = %order.status,
                    "transition suppressed"
                );
            }
        }

        notifications
    }

    /// Decode a change-event signal and decide whether it concerns this
    /// client. A corrupt cross-context payload must never take the
    /// observing context down, so parse failures are logged and swallowed.
    pub fn decode_change_event(&self, raw: &str) -> Option<Notification> {
        let signal: OrderUpdateSignal = match serde_json::from_str(raw) {
            Ok(signal) => signal,
            Err(error) => {
                tracing::debug!(%error, "discarding malformed change-event payload");
                return None;
            }
        };

        // Without an owner there is no audience; never broadcast.
        let owner = signal.owner_id?;
        if owner != self.client_id {
            tracing::trace!(
                order_id = %signal.id,
                owner = %owner,
                "change event targeted at another client"
            );
            return None;
        }

        match signal.status {
            OrderStatus::Cancelled => Some(Notification::Cancelled {
                order_id: signal.id,
                reason: signal.reason,
            }),
            OrderStatus::Completed => Some(Notification::Completed {
                order_id: signal.id,
            }),
            OrderStatus::Active | OrderStatus::Processing => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
