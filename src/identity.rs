use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::store::{SharedStore, SubscriberId, CLIENT_ID_KEY};

// ============================================================================
// Client Identity
// ============================================================================
//
// Every installation carries one stable identifier, generated on first
// startup and persisted for its lifetime. It is the sole ownership key:
// orders are stamped with it and change-event signals are targeted by it.
//
// ============================================================================

/// Opaque per-installation identifier.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ClientId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for ClientId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the persisted identity, generating and persisting a fresh one on
/// first startup. Idempotent: repeated calls return the same identity.
///
/// The identifier combines the current time with a random suffix, enough
/// to avoid collisions between installations claiming an identity at the
/// same instant.
pub fn get_or_create_client_id(store: &SharedStore, writer: SubscriberId) -> ClientId {
    if let Some(existing) = store.get(CLIENT_ID_KEY) {
        tracing::debug!(client_id = %existing, "loaded persisted client identity");
        return ClientId(existing);
    }

    let suffix = Uuid::new_v4().simple().to_string();
    let id = format!("C{}{}", Utc::now().timestamp_millis(), &suffix[..6]);
    store.set(CLIENT_ID_KEY, &id, writer);
    tracing::info!(client_id = %id, "generated new client identity");
    ClientId(id)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_created_once_and_stable() {
        let store = SharedStore::new();
        let writer = store.register();

        let first = get_or_create_client_id(&store, writer);
        let second = get_or_create_client_id(&store, writer);

        assert_eq!(first, second);
        assert_eq!(store.get(CLIENT_ID_KEY).as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_identity_has_client_prefix_and_random_tail() {
        let store = SharedStore::new();
        let writer = store.register();

        let id = get_or_create_client_id(&store, writer);
        assert!(id.as_str().starts_with('C'));
        assert!(id.as_str().len() > 7);
    }

    #[test]
    fn test_separate_stores_produce_separate_identities() {
        let a_store = SharedStore::new();
        let b_store = SharedStore::new();

        let a = get_or_create_client_id(&a_store, a_store.register());
        let b = get_or_create_client_id(&b_store, b_store.register());

        assert_ne!(a, b);
    }

    #[test]
    fn test_client_id_serializes_as_plain_string() {
        let id = ClientId::from("C1700000000000abc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"C1700000000000abc123\"");
    }
}
