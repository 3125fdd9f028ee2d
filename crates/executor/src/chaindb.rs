//! The chain database: headers, canonical index, bodies, receipts, and lookups over the
//! key-value store.

use crate::errors::ChainDbError;
use alloy_primitives::{Bytes, B256};
use alloy_rlp::Decodable;
use veda_kv::{KvBatch, SharedKeyValueStore};
use veda_primitives::{Header, Receipt, SealedHeader, Transaction};
use veda_state::{StateProvider, StateResult};
use veda_trie::{TrieError, TrieResult};

/// Key prefix for headers, by block identity.
const HEADER_PREFIX: &[u8] = b"header:";
/// Key prefix for block bodies, by block identity.
const BLOCK_TXS_PREFIX: &[u8] = b"block-txs:";
/// Key prefix for block receipts, by block identity.
const BLOCK_RECEIPTS_PREFIX: &[u8] = b"block-receipts:";
/// Key prefix for the number-to-identity canonical index.
const CANONICAL_PREFIX: &[u8] = b"canonical:";
/// Key prefix for the transaction-hash index.
const TX_INDEX_PREFIX: &[u8] = b"tx-index:";
/// Key prefix for code blobs, by code hash.
const CODE_PREFIX: &[u8] = b"code:";
/// Key of the canonical head pointer.
const HEAD_KEY: &[u8] = b"head";

fn prefixed(prefix: &[u8], suffix: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + suffix.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(suffix);
    key
}

/// The location of a transaction within the canonical chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, alloy_rlp::RlpEncodable, alloy_rlp::RlpDecodable)]
pub struct TransactionLocation {
    /// The enclosing block's number.
    pub block_number: u64,
    /// The transaction's index within the block.
    pub index: u64,
}

/// A handle to the chain database.
///
/// Raw trie nodes live at their bare 32-byte content hash; every other record sits behind an
/// ASCII prefix. All block-finalization writes are delivered through [ChainDb::write_batch]
/// so that a crash between transactions cannot leave a half-applied block.
#[derive(Debug, Clone)]
pub struct ChainDb {
    store: SharedKeyValueStore,
}

impl ChainDb {
    /// Creates a handle over the shared store.
    pub fn new(store: SharedKeyValueStore) -> Self {
        Self { store }
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ChainDbError> {
        let store =
            self.store.read().map_err(|_| ChainDbError::Store("lock poisoned".into()))?;
        Ok(store.get(key)?)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, ChainDbError> {
        let store =
            self.store.read().map_err(|_| ChainDbError::Store("lock poisoned".into()))?;
        Ok(store.exists(key)?)
    }

    /// Atomically applies a write batch.
    pub fn write_batch(&self, batch: KvBatch) -> Result<(), ChainDbError> {
        let mut store =
            self.store.write().map_err(|_| ChainDbError::Store("lock poisoned".into()))?;
        Ok(store.write_batch(batch)?)
    }

    //
    // Headers and the canonical index
    //

    /// Returns the header with the given identity.
    pub fn header(&self, hash: B256) -> Result<Option<SealedHeader>, ChainDbError> {
        let Some(raw) = self.get(&prefixed(HEADER_PREFIX, hash.as_slice()))? else {
            return Ok(None);
        };
        let header = Header::decode(&mut raw.as_slice())?;
        Ok(Some(header.seal()))
    }

    /// Returns the identity of the canonical block at `number`.
    pub fn canonical_hash(&self, number: u64) -> Result<Option<B256>, ChainDbError> {
        let Some(raw) = self.get(&prefixed(CANONICAL_PREFIX, &number.to_be_bytes()))? else {
            return Ok(None);
        };
        Ok(Some(B256::from_slice(&raw)))
    }

    /// Returns the canonical header at `number`.
    pub fn canonical_header(&self, number: u64) -> Result<Option<SealedHeader>, ChainDbError> {
        match self.canonical_hash(number)? {
            Some(hash) => self.header(hash),
            None => Ok(None),
        }
    }

    /// Returns the canonical tip.
    pub fn canonical_head(&self) -> Result<SealedHeader, ChainDbError> {
        let Some(raw) = self.get(HEAD_KEY)? else {
            return Err(ChainDbError::NotInitialized);
        };
        let hash = B256::from_slice(&raw);
        self.header(hash)?.ok_or(ChainDbError::NotInitialized)
    }

    /// Returns `true` if a world-state root is present in the store.
    pub fn has_state_root(&self, root: B256) -> Result<bool, ChainDbError> {
        self.exists(root.as_slice())
    }

    //
    // Bodies, receipts, and the transaction index
    //

    /// Returns the transactions of the block with the given identity.
    pub fn block_transactions(
        &self,
        hash: B256,
    ) -> Result<Option<Vec<Transaction>>, ChainDbError> {
        let Some(raw) = self.get(&prefixed(BLOCK_TXS_PREFIX, hash.as_slice()))? else {
            return Ok(None);
        };
        Ok(Some(Vec::<Transaction>::decode(&mut raw.as_slice())?))
    }

    /// Returns the receipts of the block with the given identity.
    pub fn block_receipts(&self, hash: B256) -> Result<Option<Vec<Receipt>>, ChainDbError> {
        let Some(raw) = self.get(&prefixed(BLOCK_RECEIPTS_PREFIX, hash.as_slice()))? else {
            return Ok(None);
        };
        Ok(Some(Vec::<Receipt>::decode(&mut raw.as_slice())?))
    }

    /// Returns the canonical location of the transaction with the given identity.
    pub fn transaction_location(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionLocation>, ChainDbError> {
        let Some(raw) = self.get(&prefixed(TX_INDEX_PREFIX, tx_hash.as_slice()))? else {
            return Ok(None);
        };
        Ok(Some(TransactionLocation::decode(&mut raw.as_slice())?))
    }

    /// Returns the identities of up to `count` ancestors of `head`, most recent first,
    /// following the canonical index.
    pub fn ancestor_hashes(&self, head: &SealedHeader, count: usize) -> Result<Vec<B256>, ChainDbError> {
        let mut hashes = Vec::with_capacity(count.min(head.block_number as usize + 1));
        let mut number = head.block_number;
        while number > 0 && hashes.len() < count {
            number -= 1;
            match self.canonical_hash(number)? {
                Some(hash) => hashes.push(hash),
                None => break,
            }
        }
        Ok(hashes)
    }

    //
    // Batch construction
    //

    /// Stages a finalized block into `batch`: header, body, receipts, canonical index,
    /// transaction index, and the head pointer.
    pub fn stage_block(
        batch: &mut KvBatch,
        header: &SealedHeader,
        transactions: &[Transaction],
        receipts: &[Receipt],
    ) {
        let hash = header.hash();
        batch.put(
            prefixed(HEADER_PREFIX, hash.as_slice()),
            alloy_rlp::encode(header.header()),
        );
        batch.put(
            prefixed(BLOCK_TXS_PREFIX, hash.as_slice()),
            alloy_rlp::encode(transactions),
        );
        batch.put(
            prefixed(BLOCK_RECEIPTS_PREFIX, hash.as_slice()),
            alloy_rlp::encode(receipts),
        );
        batch.put(
            prefixed(CANONICAL_PREFIX, &header.block_number.to_be_bytes()),
            hash.as_slice(),
        );
        batch.put(HEAD_KEY, hash.as_slice());

        for (index, tx) in transactions.iter().enumerate() {
            let location =
                TransactionLocation { block_number: header.block_number, index: index as u64 };
            batch.put(
                prefixed(TX_INDEX_PREFIX, tx.hash().as_slice()),
                alloy_rlp::encode(location),
            );
        }
    }

    /// Stages a state commit into `batch`: raw trie nodes at their content hash, code blobs
    /// behind the code prefix.
    pub fn stage_state(batch: &mut KvBatch, commit: &veda_state::StateCommit) {
        for (hash, node) in &commit.trie_nodes {
            batch.put(hash.as_slice(), node.clone());
        }
        for (code_hash, code) in &commit.codes {
            batch.put(prefixed(CODE_PREFIX, code_hash.as_slice()), code.to_vec());
        }
    }
}

impl StateProvider for ChainDb {
    fn trie_node(&self, hash: B256) -> TrieResult<Vec<u8>> {
        match self.get(hash.as_slice()) {
            Ok(Some(node)) => Ok(node),
            Ok(None) => Err(TrieError::MissingNode(hash)),
            Err(err) => Err(TrieError::Store(err.to_string())),
        }
    }

    fn bytecode(&self, code_hash: B256) -> StateResult<Option<Bytes>> {
        self.get(&prefixed(CODE_PREFIX, code_hash.as_slice()))
            .map(|code| code.map(Bytes::from))
            .map_err(|err| veda_state::StateError::Provider(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veda_kv::MemoryKeyValueStore;
    use veda_primitives::Header;

    fn db() -> ChainDb {
        ChainDb::new(veda_kv::shared(MemoryKeyValueStore::new()))
    }

    #[test]
    fn test_uninitialized_head() {
        assert_eq!(db().canonical_head(), Err(ChainDbError::NotInitialized));
    }

    #[test]
    fn test_block_roundtrip() {
        let db = db();
        let header = Header {
            block_number: 1,
            veda_block_hash: B256::repeat_byte(0x11),
            ..Default::default()
        }
        .seal();
        let tx = Transaction { veda_txhash: B256::repeat_byte(0x22), ..Default::default() };
        let receipt = Receipt::new(true, 21_000, vec![]);

        let mut batch = KvBatch::new();
        ChainDb::stage_block(&mut batch, &header, &[tx.clone()], &[receipt.clone()]);
        db.write_batch(batch).unwrap();

        assert_eq!(db.canonical_head().unwrap().hash(), header.hash());
        assert_eq!(db.canonical_hash(1).unwrap(), Some(header.hash()));
        assert_eq!(db.header(header.hash()).unwrap().unwrap(), header);
        assert_eq!(db.block_transactions(header.hash()).unwrap().unwrap(), vec![tx.clone()]);
        assert_eq!(db.block_receipts(header.hash()).unwrap().unwrap(), vec![receipt]);
        assert_eq!(
            db.transaction_location(tx.hash()).unwrap(),
            Some(TransactionLocation { block_number: 1, index: 0 })
        );
    }

    #[test]
    fn test_ancestor_hashes_walk_canonical_index() {
        let db = db();
        let mut batch = KvBatch::new();
        let mut head = None;
        for number in 0..4u64 {
            let header = Header {
                block_number: number,
                veda_block_hash: B256::repeat_byte(number as u8 + 1),
                ..Default::default()
            }
            .seal();
            ChainDb::stage_block(&mut batch, &header, &[], &[]);
            head = Some(header);
        }
        db.write_batch(batch).unwrap();

        let hashes = db.ancestor_hashes(&head.unwrap(), 256).unwrap();
        assert_eq!(
            hashes,
            vec![B256::repeat_byte(3), B256::repeat_byte(2), B256::repeat_byte(1)]
        );
    }
}
