//! In-memory store implementation.

use crate::error::{StoreError, StoreResult};
use crate::rows::{ClientGroupRow, ClientRow, MessageRow, SpaceRow};
use crate::store::{ReadTx, Store, WriteTx};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use spacesync_protocol::{ClientGroupId, ClientId, MessageId, SpaceId};
use std::collections::BTreeMap;

/// An in-memory store.
///
/// Suitable for unit tests, integration tests, and ephemeral
/// deployments that don't need persistence.
///
/// Read transactions hold the reader side of one `RwLock` over all four
/// tables, which makes every read a consistent snapshot. Write
/// transactions hold the writer side and mutate a working copy that is
/// swapped in at commit, so writers serialize, uncommitted changes are
/// never visible, and dropping a transaction rolls it back.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default, Clone)]
struct Tables {
    spaces: BTreeMap<SpaceId, SpaceRow>,
    client_groups: BTreeMap<ClientGroupId, ClientGroupRow>,
    clients: BTreeMap<ClientId, ClientRow>,
    messages: BTreeMap<(SpaceId, MessageId), MessageRow>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn read(&self) -> StoreResult<Box<dyn ReadTx + '_>> {
        Ok(Box::new(MemoryReadTx {
            tables: self.tables.read(),
        }))
    }

    fn write(&self) -> StoreResult<Box<dyn WriteTx + '_>> {
        let guard = self.tables.write();
        let working = guard.clone();
        Ok(Box::new(MemoryWriteTx { guard, working }))
    }
}

struct MemoryReadTx<'a> {
    tables: RwLockReadGuard<'a, Tables>,
}

struct MemoryWriteTx<'a> {
    guard: RwLockWriteGuard<'a, Tables>,
    working: Tables,
}

impl Tables {
    fn space_version(&self, space_id: &SpaceId) -> Option<u64> {
        self.spaces.get(space_id).map(|row| row.version)
    }

    fn messages_since(&self, space_id: &SpaceId, version: u64) -> Vec<MessageRow> {
        self.messages
            .values()
            .filter(|row| &row.space_id == space_id && row.last_modified_version > version)
            .cloned()
            .collect()
    }

    fn clients_in_group_since(
        &self,
        client_group_id: &ClientGroupId,
        version: u64,
    ) -> Vec<ClientRow> {
        self.clients
            .values()
            .filter(|row| &row.client_group_id == client_group_id && row.version > version)
            .cloned()
            .collect()
    }
}

impl ReadTx for MemoryReadTx<'_> {
    fn space_version(&self, space_id: &SpaceId) -> StoreResult<Option<u64>> {
        Ok(self.tables.space_version(space_id))
    }

    fn client(&self, client_id: &ClientId) -> StoreResult<Option<ClientRow>> {
        Ok(self.tables.clients.get(client_id).cloned())
    }

    fn message(
        &self,
        space_id: &SpaceId,
        message_id: &MessageId,
    ) -> StoreResult<Option<MessageRow>> {
        Ok(self
            .tables
            .messages
            .get(&(space_id.clone(), message_id.clone()))
            .cloned())
    }

    fn messages_since(&self, space_id: &SpaceId, version: u64) -> StoreResult<Vec<MessageRow>> {
        Ok(self.tables.messages_since(space_id, version))
    }

    fn clients_in_group_since(
        &self,
        client_group_id: &ClientGroupId,
        version: u64,
    ) -> StoreResult<Vec<ClientRow>> {
        Ok(self.tables.clients_in_group_since(client_group_id, version))
    }
}

impl ReadTx for MemoryWriteTx<'_> {
    fn space_version(&self, space_id: &SpaceId) -> StoreResult<Option<u64>> {
        Ok(self.working.space_version(space_id))
    }

    fn client(&self, client_id: &ClientId) -> StoreResult<Option<ClientRow>> {
        Ok(self.working.clients.get(client_id).cloned())
    }

    fn message(
        &self,
        space_id: &SpaceId,
        message_id: &MessageId,
    ) -> StoreResult<Option<MessageRow>> {
        Ok(self
            .working
            .messages
            .get(&(space_id.clone(), message_id.clone()))
            .cloned())
    }

    fn messages_since(&self, space_id: &SpaceId, version: u64) -> StoreResult<Vec<MessageRow>> {
        Ok(self.working.messages_since(space_id, version))
    }

    fn clients_in_group_since(
        &self,
        client_group_id: &ClientGroupId,
        version: u64,
    ) -> StoreResult<Vec<ClientRow>> {
        Ok(self.working.clients_in_group_since(client_group_id, version))
    }
}

impl WriteTx for MemoryWriteTx<'_> {
    fn insert_space(&mut self, row: SpaceRow) -> StoreResult<bool> {
        if self.working.spaces.contains_key(&row.id) {
            return Ok(false);
        }
        self.working.spaces.insert(row.id.clone(), row);
        Ok(true)
    }

    fn set_space_version(
        &mut self,
        space_id: &SpaceId,
        version: u64,
        last_modified_ms: i64,
    ) -> StoreResult<()> {
        let row = self
            .working
            .spaces
            .get_mut(space_id)
            .ok_or_else(|| StoreError::UnknownSpace {
                space_id: space_id.clone(),
            })?;
        row.version = version;
        row.last_modified_ms = last_modified_ms;
        Ok(())
    }

    fn put_client_group(&mut self, row: ClientGroupRow) -> StoreResult<()> {
        self.working.client_groups.insert(row.id.clone(), row);
        Ok(())
    }

    fn put_client(&mut self, row: ClientRow) -> StoreResult<()> {
        self.working.clients.insert(row.id.clone(), row);
        Ok(())
    }

    fn put_message(&mut self, row: MessageRow) -> StoreResult<()> {
        self.working
            .messages
            .insert((row.space_id.clone(), row.id.clone()), row);
        Ok(())
    }

    fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryWriteTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space_row(id: &str, version: u64) -> SpaceRow {
        SpaceRow {
            id: SpaceId::new(id),
            version,
            last_modified_ms: 0,
        }
    }

    fn message_row(space: &str, id: &str, version: u64, deleted: bool) -> MessageRow {
        MessageRow {
            id: MessageId::new(id),
            space_id: SpaceId::new(space),
            sender: "c1".into(),
            content: "hi".into(),
            ord: 1,
            deleted,
            last_modified_version: version,
        }
    }

    fn client_row(id: &str, group: &str, lmid: u64, version: u64) -> ClientRow {
        ClientRow {
            id: ClientId::new(id),
            client_group_id: ClientGroupId::new(group),
            last_mutation_id: lmid,
            version,
            last_modified_ms: 0,
        }
    }

    #[test]
    fn empty_store_has_no_spaces() {
        let store = MemoryStore::new();
        let tx = store.read().unwrap();
        assert_eq!(tx.space_version(&SpaceId::new("s1")).unwrap(), None);
    }

    #[test]
    fn committed_writes_are_visible() {
        let store = MemoryStore::new();

        let mut tx = store.write().unwrap();
        assert!(tx.insert_space(space_row("s1", 0)).unwrap());
        tx.set_space_version(&SpaceId::new("s1"), 3, 42).unwrap();
        tx.commit().unwrap();

        let tx = store.read().unwrap();
        assert_eq!(tx.space_version(&SpaceId::new("s1")).unwrap(), Some(3));
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let store = MemoryStore::new();

        {
            let mut tx = store.write().unwrap();
            tx.insert_space(space_row("s1", 0)).unwrap();
            tx.put_message(message_row("s1", "m1", 1, false)).unwrap();
            // no commit
        }

        let tx = store.read().unwrap();
        assert_eq!(tx.space_version(&SpaceId::new("s1")).unwrap(), None);
        assert_eq!(
            tx.message(&SpaceId::new("s1"), &MessageId::new("m1"))
                .unwrap(),
            None
        );
    }

    #[test]
    fn insert_space_rejects_duplicates() {
        let store = MemoryStore::new();

        let mut tx = store.write().unwrap();
        assert!(tx.insert_space(space_row("s1", 0)).unwrap());
        assert!(!tx.insert_space(space_row("s1", 9)).unwrap());
        tx.commit().unwrap();

        let tx = store.read().unwrap();
        assert_eq!(tx.space_version(&SpaceId::new("s1")).unwrap(), Some(0));
    }

    #[test]
    fn set_space_version_requires_existing_row() {
        let store = MemoryStore::new();
        let mut tx = store.write().unwrap();
        let err = tx
            .set_space_version(&SpaceId::new("ghost"), 1, 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownSpace { .. }));
    }

    #[test]
    fn write_tx_reads_its_own_writes() {
        let store = MemoryStore::new();

        let mut tx = store.write().unwrap();
        tx.put_message(message_row("s1", "m1", 1, false)).unwrap();
        let seen = tx
            .message(&SpaceId::new("s1"), &MessageId::new("m1"))
            .unwrap();
        assert!(seen.is_some());
    }

    #[test]
    fn messages_since_filters_by_space_and_version() {
        let store = MemoryStore::new();

        let mut tx = store.write().unwrap();
        tx.put_message(message_row("s1", "m1", 1, false)).unwrap();
        tx.put_message(message_row("s1", "m2", 2, true)).unwrap();
        tx.put_message(message_row("s2", "m3", 5, false)).unwrap();
        tx.commit().unwrap();

        let tx = store.read().unwrap();
        let since0 = tx.messages_since(&SpaceId::new("s1"), 0).unwrap();
        assert_eq!(since0.len(), 2);

        let since1 = tx.messages_since(&SpaceId::new("s1"), 1).unwrap();
        assert_eq!(since1.len(), 1);
        assert_eq!(since1[0].id, MessageId::new("m2"));
        assert!(since1[0].deleted);

        assert!(tx.messages_since(&SpaceId::new("s1"), 2).unwrap().is_empty());
    }

    #[test]
    fn clients_in_group_since_filters_by_group_and_version() {
        let store = MemoryStore::new();

        let mut tx = store.write().unwrap();
        tx.put_client(client_row("c1", "g1", 3, 1)).unwrap();
        tx.put_client(client_row("c2", "g1", 8, 4)).unwrap();
        tx.put_client(client_row("c3", "g2", 1, 9)).unwrap();
        tx.commit().unwrap();

        let tx = store.read().unwrap();
        let changed = tx
            .clients_in_group_since(&ClientGroupId::new("g1"), 1)
            .unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, ClientId::new("c2"));
        assert_eq!(changed[0].last_mutation_id, 8);
    }

    #[test]
    fn put_client_upserts() {
        let store = MemoryStore::new();

        let mut tx = store.write().unwrap();
        tx.put_client(client_row("c1", "g1", 1, 1)).unwrap();
        tx.put_client(client_row("c1", "g1", 2, 2)).unwrap();
        tx.commit().unwrap();

        let tx = store.read().unwrap();
        let row = tx.client(&ClientId::new("c1")).unwrap().unwrap();
        assert_eq!(row.last_mutation_id, 2);
        assert_eq!(row.version, 2);
    }
}
