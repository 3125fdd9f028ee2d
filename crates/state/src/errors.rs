//! Errors for the `veda-state` crate.

use alloy_primitives::B256;
use veda_trie::TrieError;

/// A [Result] type alias where the error is [StateError].
pub type StateResult<T> = Result<T, StateError>;

/// An error type for world-state operations.
#[derive(Debug, derive_more::Display, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A trie operation failed. [TrieError::MissingNode] here signals a corrupt or
    /// incomplete database and is fatal for the enclosing block application.
    #[display("Trie error: {_0}")]
    Trie(TrieError),
    /// A code blob referenced by an account was absent from the store.
    #[display("Missing bytecode for code hash: {_0}")]
    MissingCode(B256),
    /// A snapshot token was applied out of order.
    #[display("Invalid snapshot token")]
    InvalidSnapshot,
    /// The backing provider rejected an operation.
    #[display("State provider error: {_0}")]
    Provider(String),
}

impl core::error::Error for StateError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Trie(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TrieError> for StateError {
    fn from(err: TrieError) -> Self {
        Self::Trie(err)
    }
}

impl StateError {
    /// Returns `true` if the error stems from a missing trie node, the signature of a corrupt
    /// database.
    pub const fn is_missing_node(&self) -> bool {
        matches!(self, Self::Trie(TrieError::MissingNode(_)))
    }
}
