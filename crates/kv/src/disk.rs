//! Contains a concrete implementation of the [KeyValueStore] trait that stores data on disk
//! using [rocksdb].

use crate::{BatchOp, KeyValueStore, KvBatch, KvError, KvResult, MemoryKeyValueStore};
use rocksdb::{Options, WriteBatch, DB};
use std::path::PathBuf;

/// A simple, synchronous key-value store that stores data on disk.
#[derive(Debug)]
pub struct DiskKeyValueStore {
    db: DB,
}

impl DiskKeyValueStore {
    /// Create a new [DiskKeyValueStore] with the given data directory.
    pub fn open(data_directory: PathBuf) -> KvResult<Self> {
        let db = DB::open(&Self::db_options(), data_directory.as_path()).map_err(|e| {
            KvError::Open {
                path: data_directory.display().to_string(),
                message: e.into_string(),
            }
        })?;

        Ok(Self { db })
    }

    /// Gets the [Options] for the underlying RocksDB instance.
    fn db_options() -> Options {
        let mut options = Options::default();
        options.set_compression_type(rocksdb::DBCompressionType::Snappy);
        options.create_if_missing(true);
        options
    }
}

impl KeyValueStore for DiskKeyValueStore {
    fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> KvResult<()> {
        Ok(self.db.put(key, value)?)
    }

    fn delete(&mut self, key: &[u8]) -> KvResult<()> {
        Ok(self.db.delete(key)?)
    }

    fn write_batch(&mut self, batch: KvBatch) -> KvResult<()> {
        let mut write_batch = WriteBatch::default();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { key, value } => write_batch.put(key, value),
                BatchOp::Delete { key } => write_batch.delete(key),
            }
        }
        Ok(self.db.write(write_batch)?)
    }
}

impl TryFrom<&DiskKeyValueStore> for MemoryKeyValueStore {
    type Error = KvError;

    fn try_from(disk_store: &DiskKeyValueStore) -> KvResult<MemoryKeyValueStore> {
        let mut memory_store = MemoryKeyValueStore::new();
        let mut db_iter = disk_store.db.full_iterator(rocksdb::IteratorMode::Start);

        while let Some(kv) = db_iter.next() {
            let (key, value) = kv?;
            memory_store.put(key.as_ref(), value.to_vec())?;
        }

        Ok(memory_store)
    }
}

#[cfg(test)]
mod tests {
    use super::DiskKeyValueStore;
    use crate::{KeyValueStore, KvBatch, MemoryKeyValueStore};
    use proptest::{
        arbitrary::any,
        collection::{hash_map, vec},
        proptest,
    };

    proptest! {
        /// Test that converting from a [DiskKeyValueStore] to a [MemoryKeyValueStore] is lossless.
        #[test]
        fn convert_disk_kv_to_mem_kv(k_v in hash_map(vec(any::<u8>(), 1..64), vec(any::<u8>(), 0..128), 1..64)) {
            let tempdir = tempfile::tempdir().unwrap();
            let mut disk_kv = DiskKeyValueStore::open(tempdir.path().to_path_buf()).unwrap();
            k_v.iter().for_each(|(k, v)| {
                disk_kv.put(k, v.to_vec()).unwrap();
            });

            let mem_kv = MemoryKeyValueStore::try_from(&disk_kv).unwrap();
            for (k, v) in k_v {
                assert_eq!(mem_kv.get(&k).unwrap().unwrap(), v.to_vec());
            }
        }
    }

    #[test]
    fn test_batch_applied_atomically_in_order() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut disk_kv = DiskKeyValueStore::open(tempdir.path().to_path_buf()).unwrap();

        let mut batch = KvBatch::new();
        batch.put(b"header".to_vec(), b"h1".to_vec());
        batch.put(b"canonical".to_vec(), b"c1".to_vec());
        batch.delete(b"header".to_vec());
        disk_kv.write_batch(batch).unwrap();

        assert_eq!(disk_kv.get(b"header").unwrap(), None);
        assert_eq!(disk_kv.get(b"canonical").unwrap(), Some(b"c1".to_vec()));
    }
}
