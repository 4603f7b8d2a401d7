//! Connection registry: the single source of truth for who is online.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;

use crate::connection::handle::ConnectionId;
use crate::message::types::same_id;

use super::record::PresenceRecord;

/// Storage for presence records keyed by connection.
///
/// Implementations are owned by the relay dispatcher, which serializes every
/// call, so methods take `&mut self` and need no internal locking.
pub trait PresenceRegistry: Send + std::fmt::Debug + 'static {
    /// Store a record for `connection_id`, replacing any previous one.
    fn register(
        &mut self,
        connection_id: ConnectionId,
        user_id: Value,
        display_name: Value,
    ) -> PresenceRecord;

    /// Remove and return the record for `connection_id`.
    fn unregister(&mut self, connection_id: &ConnectionId) -> Option<PresenceRecord>;

    /// Record for one connection.
    fn lookup_by_connection(&self, connection_id: &ConnectionId) -> Option<PresenceRecord>;

    /// Record announcing `user_id`, compared with [`same_id`]. When several
    /// connections share the user ID, the most recently registered one is
    /// returned.
    fn find_by_user_id(&self, user_id: &Value) -> Option<PresenceRecord>;

    /// All records, oldest registration first.
    fn snapshot(&self) -> Vec<PresenceRecord>;

    /// Number of registered connections.
    fn len(&self) -> usize;

    /// Whether nobody is registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct Entry {
    seq: u64,
    record: PresenceRecord,
}

/// Process-local registry backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryPresenceRegistry {
    entries: HashMap<ConnectionId, Entry>,
    next_seq: u64,
}

impl InMemoryPresenceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresenceRegistry for InMemoryPresenceRegistry {
    fn register(
        &mut self,
        connection_id: ConnectionId,
        user_id: Value,
        display_name: Value,
    ) -> PresenceRecord {
        let record = PresenceRecord {
            user_id,
            display_name,
            connection_id,
            connected_at: Utc::now(),
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            connection_id,
            Entry {
                seq,
                record: record.clone(),
            },
        );
        record
    }

    fn unregister(&mut self, connection_id: &ConnectionId) -> Option<PresenceRecord> {
        self.entries.remove(connection_id).map(|entry| entry.record)
    }

    fn lookup_by_connection(&self, connection_id: &ConnectionId) -> Option<PresenceRecord> {
        self.entries
            .get(connection_id)
            .map(|entry| entry.record.clone())
    }

    fn find_by_user_id(&self, user_id: &Value) -> Option<PresenceRecord> {
        self.entries
            .values()
            .filter(|entry| same_id(&entry.record.user_id, user_id))
            .max_by_key(|entry| entry.seq)
            .map(|entry| entry.record.clone())
    }

    fn snapshot(&self) -> Vec<PresenceRecord> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.record.clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = InMemoryPresenceRegistry::new();
        let conn = Uuid::new_v4();
        let record = registry.register(conn, "u1".into(), "Alice".into());

        assert_eq!(record.connection_id, conn);
        assert_eq!(registry.lookup_by_connection(&conn), Some(record));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_overwrites_same_connection() {
        let mut registry = InMemoryPresenceRegistry::new();
        let conn = Uuid::new_v4();
        registry.register(conn, "u1".into(), "Alice".into());
        registry.register(conn, "u1".into(), "Alicia".into());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot()[0].display_name, "Alicia");
    }

    #[test]
    fn test_unregister_unknown_leaves_registry_intact() {
        let mut registry = InMemoryPresenceRegistry::new();
        registry.register(Uuid::new_v4(), "u1".into(), "Alice".into());

        assert!(registry.unregister(&Uuid::new_v4()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_returns_record() {
        let mut registry = InMemoryPresenceRegistry::new();
        let conn = Uuid::new_v4();
        registry.register(conn, "u1".into(), "Alice".into());

        let removed = registry.unregister(&conn).unwrap();
        assert_eq!(removed.user_id, "u1");
        assert!(registry.is_empty());
        assert!(registry.unregister(&conn).is_none());
    }

    #[test]
    fn test_snapshot_in_registration_order() {
        let mut registry = InMemoryPresenceRegistry::new();
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for (i, id) in ids.iter().enumerate() {
            registry.register(*id, json!(format!("u{i}")), json!(format!("User {i}")));
        }
        registry.unregister(&ids[2]);

        let users: Vec<Value> = registry
            .snapshot()
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        assert_eq!(users, vec![json!("u0"), json!("u1"), json!("u3"), json!("u4")]);
    }

    #[test]
    fn test_find_by_user_id_prefers_latest() {
        let mut registry = InMemoryPresenceRegistry::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        registry.register(first, "shared".into(), "Tab 1".into());
        registry.register(second, "shared".into(), "Tab 2".into());

        let found = registry.find_by_user_id(&json!("shared")).unwrap();
        assert_eq!(found.connection_id, second);

        registry.unregister(&second);
        let found = registry.find_by_user_id(&json!("shared")).unwrap();
        assert_eq!(found.connection_id, first);

        assert!(registry.find_by_user_id(&json!("nobody")).is_none());
    }

    #[test]
    fn test_find_by_user_id_is_type_strict() {
        let mut registry = InMemoryPresenceRegistry::new();
        let conn = Uuid::new_v4();
        registry.register(conn, json!(42), json!("Numeric"));

        assert_eq!(
            registry.find_by_user_id(&json!(42)).map(|r| r.connection_id),
            Some(conn)
        );
        assert!(registry.find_by_user_id(&json!("42")).is_none());
    }
}
