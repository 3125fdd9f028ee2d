//! The undo log backing state snapshots.

use crate::account::TrieAccount;
use alloy_primitives::{Address, U256};
use std::collections::HashMap;

/// A single reversible state mutation.
///
/// Each entry records what a mutation displaced, so reverting is a right-to-left replay of
/// the log. A `prev` of `None` means the cache slot did not exist before the mutation and is
/// removed again on revert, falling back to the committed value in the trie.
#[derive(Debug, Clone)]
pub(crate) enum JournalEntry {
    /// An account cache slot changed.
    Account {
        /// The account's address.
        address: Address,
        /// The displaced cache entry.
        prev: Option<Option<TrieAccount>>,
    },
    /// A pending storage write changed.
    Storage {
        /// The account's address.
        address: Address,
        /// The storage slot.
        slot: U256,
        /// The displaced pending write.
        prev: Option<U256>,
    },
    /// An account's pending storage writes were wiped by a deletion.
    StorageWipe {
        /// The account's address.
        address: Address,
        /// The wiped pending writes.
        prev: HashMap<U256, U256>,
    },
    /// An address became warm.
    WarmAddress {
        /// The address marked warm.
        address: Address,
    },
    /// A storage slot became warm.
    WarmSlot {
        /// The account's address.
        address: Address,
        /// The storage slot marked warm.
        slot: U256,
    },
    /// An account was touched.
    Touch {
        /// The touched address.
        address: Address,
    },
}

/// An opaque token referring to a point in the state's undo log.
///
/// Committing a snapshot merges everything above it into the next lower layer; reverting
/// discards it. Tokens must be resolved in LIFO order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Length of the journal when the snapshot was taken.
    pub(crate) journal_len: usize,
    /// Depth of the checkpoint stack after the snapshot was taken.
    pub(crate) depth: usize,
}
