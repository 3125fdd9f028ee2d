#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use std::sync::{Arc, RwLock};

mod batch;
pub use batch::{BatchOp, KvBatch};

mod mem;
pub use mem::MemoryKeyValueStore;

mod disk;
pub use disk::DiskKeyValueStore;

mod errors;
pub use errors::{KvError, KvResult};

/// Describes the interface of a simple, synchronous, byte-keyed key-value store.
///
/// The chain database, trie node store, and code store all sit on top of this trait. A
/// [KvBatch] delivered through [KeyValueStore::write_batch] is applied atomically: either
/// every operation in the batch is visible afterwards, or none are.
pub trait KeyValueStore {
    /// Get the value associated with the given key.
    fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>>;

    /// Set the value associated with the given key.
    fn put(&mut self, key: &[u8], value: Vec<u8>) -> KvResult<()>;

    /// Remove the value associated with the given key, if any.
    fn delete(&mut self, key: &[u8]) -> KvResult<()>;

    /// Returns `true` if the given key is present.
    fn exists(&self, key: &[u8]) -> KvResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Atomically apply every operation in the given batch.
    fn write_batch(&mut self, batch: KvBatch) -> KvResult<()>;
}

/// A process-wide handle to a [KeyValueStore].
///
/// Writers (the block import path) take the write half; readers take the read half. The
/// lock is what serializes concurrent access to the underlying store, standing in for the
/// per-connection request lock of the dedicated database process in the original design.
pub type SharedKeyValueStore = Arc<RwLock<dyn KeyValueStore + Send + Sync>>;

/// Wraps a [KeyValueStore] in a [SharedKeyValueStore] handle.
pub fn shared<S>(store: S) -> SharedKeyValueStore
where
    S: KeyValueStore + Send + Sync + 'static,
{
    Arc::new(RwLock::new(store))
}
