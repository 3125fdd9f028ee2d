//! The output of persisting the world state.

use alloy_primitives::{Bytes, B256};
use std::collections::{BTreeSet, HashMap};

/// The buffered writes produced by [State::persist], ready to be folded into the block's
/// atomic KV batch: new trie nodes keyed by hash, and new code blobs keyed by code hash.
///
/// [State::persist]: crate::State::persist
#[derive(Debug, Clone, Default)]
pub struct StateCommit {
    /// The world-state root after the commit.
    pub state_root: B256,
    /// New trie nodes, keyed by the keccak of their RLP encoding.
    pub trie_nodes: HashMap<B256, Vec<u8>>,
    /// New code blobs, keyed by code hash.
    pub codes: Vec<(B256, Bytes)>,
    /// Observability summary of what the commit touched.
    pub witness: StateWitness,
}

/// A summary of a [StateCommit], used only for observability.
///
/// [StateCommit]: StateCommit
#[derive(Debug, Clone, Default)]
pub struct StateWitness {
    /// Hashes of every trie node written.
    pub trie_nodes: BTreeSet<B256>,
    /// The number of accounts re-encoded into the world trie.
    pub accounts: usize,
    /// The number of code blobs written.
    pub codes: usize,
    /// The number of storage slots written or cleared.
    pub slots: usize,
}
