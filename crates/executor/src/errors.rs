//! Errors for the `veda-executor` crate.

use alloy_primitives::B256;
use veda_state::StateError;

/// A [Result] type alias where the error is [ExecutorError].
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// An error type for block application.
#[derive(Debug, derive_more::Display, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// A block failed validation. Never persisted.
    #[display("Validation error: {_0}")]
    Validation(ValidationError),
    /// The state layer failed. A missing trie node here means the database is corrupt; the
    /// block application is aborted.
    #[display("State error: {_0}")]
    State(StateError),
    /// The chain database failed.
    #[display("Chain database error: {_0}")]
    ChainDb(ChainDbError),
}

impl core::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::State(err) => Some(err),
            Self::ChainDb(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ExecutorError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<StateError> for ExecutorError {
    fn from(err: StateError) -> Self {
        Self::State(err)
    }
}

impl From<ChainDbError> for ExecutorError {
    fn from(err: ChainDbError) -> Self {
        Self::ChainDb(err)
    }
}

impl From<veda_trie::TrieError> for ExecutorError {
    fn from(err: veda_trie::TrieError) -> Self {
        Self::State(StateError::Trie(err))
    }
}

/// A block-level validation failure. The offending block is rejected and nothing is
/// persisted.
#[derive(Debug, derive_more::Display, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The block does not extend the canonical tip.
    #[display("Block #{number} does not extend the canonical tip: expected parent {expected}, got {got}")]
    ParentMismatch {
        /// The block's number.
        number: u64,
        /// The canonical tip's identity.
        expected: B256,
        /// The parent hash the block carries.
        got: B256,
    },
    /// The block number does not increase by exactly one.
    #[display("Invalid block number: expected {expected}, got {got}")]
    BlockNumber {
        /// The expected number.
        expected: u64,
        /// The number the block carries.
        got: u64,
    },
    /// The timestamp does not strictly increase from the parent.
    #[display("Timestamp {timestamp} is not after parent timestamp {parent_timestamp}")]
    Timestamp {
        /// The block's timestamp.
        timestamp: u64,
        /// The parent's timestamp.
        parent_timestamp: u64,
    },
    /// The `extra_data` field exceeds 32 bytes.
    #[display("Extra data is {_0} bytes, the limit is 32")]
    ExtraDataTooLong(usize),
    /// The header's transaction root does not match the block body.
    #[display("Transaction root mismatch: header {header}, computed {computed}")]
    TransactionRoot {
        /// The root carried in the header.
        header: B256,
        /// The root recomputed from the body.
        computed: B256,
    },
    /// The header's state root is neither known to the store nor the just-computed root.
    #[display("Unknown state root: {_0}")]
    StateRoot(B256),
    /// The header bloom does not cover a log emitted by the block.
    #[display("Header bloom is missing a log from the block's receipts")]
    BloomMismatch,
}

impl core::error::Error for ValidationError {}

/// An error type for chain-database operations.
#[derive(Debug, derive_more::Display, Clone, PartialEq, Eq)]
pub enum ChainDbError {
    /// The underlying key-value store failed.
    #[display("Key-value store error: {_0}")]
    Store(String),
    /// A stored record failed to decode.
    #[display("Failed to decode stored record: {_0}")]
    Rlp(alloy_rlp::Error),
    /// The chain has not been initialized with a genesis block.
    #[display("Chain is not initialized")]
    NotInitialized,
}

impl core::error::Error for ChainDbError {}

impl From<veda_kv::KvError> for ChainDbError {
    fn from(err: veda_kv::KvError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<alloy_rlp::Error> for ChainDbError {
    fn from(err: alloy_rlp::Error) -> Self {
        Self::Rlp(err)
    }
}
