//! Errors for the `veda-trie` crate.

use alloy_primitives::B256;

/// A [Result] type alias where the error is [TrieError].
pub type TrieResult<T> = Result<T, TrieError>;

/// An error type for trie operations.
#[derive(Debug, derive_more::Display, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// A referenced trie node was absent from the node store. This indicates a corrupt or
    /// incomplete database and is fatal for the operation that encountered it.
    #[display("Missing trie node: {_0}")]
    MissingNode(B256),
    /// A trie node failed to decode.
    #[display("Failed to decode trie node: {_0}")]
    Rlp(alloy_rlp::Error),
    /// A trie node was structurally invalid.
    #[display("Invalid trie node encountered")]
    InvalidNode,
    /// The node store rejected an operation.
    #[display("Node store error: {_0}")]
    Store(String),
}

impl core::error::Error for TrieError {}

impl From<alloy_rlp::Error> for TrieError {
    fn from(err: alloy_rlp::Error) -> Self {
        Self::Rlp(err)
    }
}

impl From<veda_kv::KvError> for TrieError {
    fn from(err: veda_kv::KvError) -> Self {
        Self::Store(err.to_string())
    }
}
