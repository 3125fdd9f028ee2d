//! The [StateProvider] trait for fetching trie node preimages and contract bytecode.

use crate::errors::StateResult;
use alloy_primitives::{keccak256, Bytes, B256};
use std::collections::HashMap;
use veda_trie::{TrieError, TrieResult};

/// The read interface the world state sits on: trie node preimages and code blobs, both
/// content-addressed.
pub trait StateProvider {
    /// Fetches the RLP preimage of the trie node with the given hash.
    ///
    /// Returns [TrieError::MissingNode] if the node is absent.
    fn trie_node(&self, hash: B256) -> TrieResult<Vec<u8>>;

    /// Fetches the bytecode with the given code hash, or `None` if unknown.
    fn bytecode(&self, code_hash: B256) -> StateResult<Option<Bytes>>;
}

impl<T: StateProvider + ?Sized> StateProvider for &T {
    fn trie_node(&self, hash: B256) -> TrieResult<Vec<u8>> {
        (**self).trie_node(hash)
    }

    fn bytecode(&self, code_hash: B256) -> StateResult<Option<Bytes>> {
        (**self).bytecode(code_hash)
    }
}

impl<T: StateProvider + ?Sized> StateProvider for std::sync::Arc<T> {
    fn trie_node(&self, hash: B256) -> TrieResult<Vec<u8>> {
        (**self).trie_node(hash)
    }

    fn bytecode(&self, code_hash: B256) -> StateResult<Option<Bytes>> {
        (**self).bytecode(code_hash)
    }
}

/// An in-memory [StateProvider], used in tests and as the scratch store behind costless
/// call/estimate execution.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateProvider {
    nodes: HashMap<B256, Vec<u8>>,
    codes: HashMap<B256, Bytes>,
}

impl MemoryStateProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a trie node preimage.
    pub fn insert_node(&mut self, preimage: Vec<u8>) -> B256 {
        let hash = keccak256(&preimage);
        self.nodes.insert(hash, preimage);
        hash
    }

    /// Inserts a code blob.
    pub fn insert_code(&mut self, code: Bytes) -> B256 {
        let hash = keccak256(&code);
        self.codes.insert(hash, code);
        hash
    }

    /// Absorbs a set of node writes, as drained from a trie or a state commit.
    pub fn extend_nodes(&mut self, nodes: impl IntoIterator<Item = (B256, Vec<u8>)>) {
        self.nodes.extend(nodes);
    }
}

impl StateProvider for MemoryStateProvider {
    fn trie_node(&self, hash: B256) -> TrieResult<Vec<u8>> {
        self.nodes.get(&hash).cloned().ok_or(TrieError::MissingNode(hash))
    }

    fn bytecode(&self, code_hash: B256) -> StateResult<Option<Bytes>> {
        Ok(self.codes.get(&code_hash).cloned())
    }
}

