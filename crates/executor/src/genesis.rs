//! Chain bootstrap.

use crate::{
    chaindb::ChainDb,
    errors::{ChainDbError, ExecutorResult},
};
use tracing::info;
use veda_kv::KvBatch;
use veda_primitives::{Header, SealedHeader};

/// Ensures the chain is initialized, writing the genesis block on first boot. Returns the
/// canonical tip.
pub fn initialize_chain(db: &ChainDb) -> ExecutorResult<SealedHeader> {
    match db.canonical_head() {
        Ok(head) => Ok(head),
        Err(ChainDbError::NotInitialized) => {
            let genesis = Header::genesis().seal();
            let mut batch = KvBatch::new();
            ChainDb::stage_block(&mut batch, &genesis, &[], &[]);
            db.write_batch(batch)?;
            info!(
                target: "executor",
                genesis_hash = %genesis.hash(),
                state_root = %genesis.state_root,
                "Initialized chain with genesis block",
            );
            Ok(genesis)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veda_kv::MemoryKeyValueStore;

    #[test]
    fn test_initialize_is_idempotent() {
        let db = ChainDb::new(veda_kv::shared(MemoryKeyValueStore::new()));
        let first = initialize_chain(&db).unwrap();
        let second = initialize_chain(&db).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.block_number, 0);
        assert_eq!(db.canonical_hash(0).unwrap(), Some(first.hash()));
    }
}
