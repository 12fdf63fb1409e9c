use actix::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::StoreChanged;

// ============================================================================
// In-Memory Shared Store
// ============================================================================
//
// Stands in for the host's persisted store. All open contexts hold clones
// of the same `SharedStore`; a write from one context fans out a
// `StoreChanged` message to every other subscribed context.
//
// Subscription is two-step so a context can stamp its writes before its
// actor has started:
// 1. `register()` allocates the writer identity
// 2. `attach()` connects the started actor's mailbox
//
// ============================================================================

/// Identifies one execution context to the store. Writes carry it so the
/// fan-out can skip the writer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriberId(u64);

#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    values: Mutex<HashMap<String, String>>,
    subscribers: Mutex<Vec<(SubscriberId, Recipient<StoreChanged>)>>,
    next_subscriber: AtomicU64,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a writer identity for a new context.
    pub fn register(&self) -> SubscriberId {
        SubscriberId(self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed))
    }

    /// Connect a context's mailbox to the change fan-out.
    pub fn attach(&self, id: SubscriberId, recipient: Recipient<StoreChanged>) {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .expect("store subscriber lock poisoned");
        subscribers.push((id, recipient));
        tracing::debug!(subscriber = ?id, "context attached to store change feed");
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .values
            .lock()
            .expect("store value lock poisoned")
            .get(key)
            .cloned()
    }

    /// Store a value and notify every subscriber except the writer.
    pub fn set(&self, key: &str, value: &str, writer: SubscriberId) {
        let old_value = {
            let mut values = self.inner.values.lock().expect("store value lock poisoned");
            values.insert(key.to_string(), value.to_string())
        };

        let subscribers = self
            .inner
            .subscribers
            .lock()
            .expect("store subscriber lock poisoned");

        let mut notified = 0;
        for (id, recipient) in subscribers.iter() {
            if *id == writer {
                continue;
            }
            recipient.do_send(StoreChanged {
                key: key.to_string(),
                old_value: old_value.clone(),
                new_value: Some(value.to_string()),
            });
            notified += 1;
        }

        tracing::trace!(key = %key, notified, "store key written");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_round_trips() {
        let store = SharedStore::new();
        let writer = store.register();

        assert_eq!(store.get("missing"), None);

        store.set("orders_v1", "[]", writer);
        assert_eq!(store.get("orders_v1").as_deref(), Some("[]"));

        store.set("orders_v1", "[1]", writer);
        assert_eq!(store.get("orders_v1").as_deref(), Some("[1]"));
    }

    #[test]
    fn test_register_allocates_distinct_ids() {
        let store = SharedStore::new();
        let a = store.register();
        let b = store.register();
        assert_ne!(a, b);
    }

    // Collector actor used to observe the fan-out in async tests.
    struct Collector {
        seen: Vec<StoreChanged>,
    }

    impl Actor for Collector {
        type Context = Context<Self>;
    }

    impl Handler<StoreChanged> for Collector {
        type Result = ();

        fn handle(&mut self, msg: StoreChanged, _: &mut Context<Self>) {
            self.seen.push(msg);
        }
    }

    #[derive(Message)]
    #[rtype(result = "Vec<StoreChanged>")]
    struct Drain;

    impl Handler<Drain> for Collector {
        type Result = MessageResult<Drain>;

        fn handle(&mut self, _: Drain, _: &mut Context<Self>) -> Self::Result {
            MessageResult(std::mem::take(&mut self.seen))
        }
    }

    #[actix::test]
    async fn test_writer_does_not_observe_its_own_write() {
        let store = SharedStore::new();
        let writer = store.register();
        let observer = store.register();

        let writer_addr = Collector { seen: Vec::new() }.start();
        let observer_addr = Collector { seen: Vec::new() }.start();
        store.attach(writer, writer_addr.clone().recipient());
        store.attach(observer, observer_addr.clone().recipient());

        store.set("orders_v1", "[]", writer);

        // Mailboxes are FIFO, so the Drain response proves earlier
        // deliveries were already processed.
        let writer_seen = writer_addr.send(Drain).await.unwrap();
        let observer_seen = observer_addr.send(Drain).await.unwrap();

        assert!(writer_seen.is_empty());
        assert_eq!(observer_seen.len(), 1);
        assert_eq!(observer_seen[0].key, "orders_v1");
        assert_eq!(observer_seen[0].old_value, None);
        assert_eq!(observer_seen[0].new_value.as_deref(), Some("[]"));
    }

    #[actix::test]
    async fn test_old_value_travels_with_the_change() {
        let store = SharedStore::new();
        let writer = store.register();
        let observer = store.register();

        let observer_addr = Collector { seen: Vec::new() }.start();
        store.attach(observer, observer_addr.clone().recipient());

        store.set("k", "first", writer);
        store.set("k", "second", writer);

        let seen = observer_addr.send(Drain).await.unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].old_value.as_deref(), Some("first"));
        assert_eq!(seen[1].new_value.as_deref(), Some("second"));
    }
}
