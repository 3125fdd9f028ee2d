//! Contains a concrete implementation of the [KeyValueStore] trait that stores data in memory.

use crate::{BatchOp, KeyValueStore, KvBatch, KvResult};
use std::collections::HashMap;

/// A simple, synchronous key-value store that stores data in memory. This is useful for testing
/// and development purposes.
#[derive(Default, Clone, Debug, Eq, PartialEq)]
pub struct MemoryKeyValueStore {
    store: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryKeyValueStore {
    /// Create a new [MemoryKeyValueStore] with an empty store.
    pub fn new() -> Self {
        Self { store: HashMap::new() }
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        Ok(self.store.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> KvResult<()> {
        self.store.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> KvResult<()> {
        self.store.remove(key);
        Ok(())
    }

    fn write_batch(&mut self, batch: KvBatch) -> KvResult<()> {
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { key, value } => {
                    self.store.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    self.store.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let mut kv = MemoryKeyValueStore::new();
        kv.put(b"alpha", b"one".to_vec()).unwrap();
        assert_eq!(kv.get(b"alpha").unwrap(), Some(b"one".to_vec()));
        assert!(kv.exists(b"alpha").unwrap());

        kv.delete(b"alpha").unwrap();
        assert_eq!(kv.get(b"alpha").unwrap(), None);
        assert!(!kv.exists(b"alpha").unwrap());
    }

    #[test]
    fn test_batch_last_write_wins() {
        let mut kv = MemoryKeyValueStore::new();
        let mut batch = KvBatch::new();
        batch.put(b"k".to_vec(), b"v1".to_vec());
        batch.delete(b"k".to_vec());
        batch.put(b"k".to_vec(), b"v2".to_vec());
        kv.write_batch(batch).unwrap();

        assert_eq!(kv.get(b"k").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(kv.len(), 1);
    }
}
