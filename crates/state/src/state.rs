//! The journaled world state.

use crate::{
    account::TrieAccount,
    commit::{StateCommit, StateWitness},
    errors::{StateError, StateResult},
    journal::{JournalEntry, Snapshot},
    provider::StateProvider,
};
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::Decodable;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::trace;
use veda_primitives::constants::KECCAK_EMPTY;
use veda_trie::{NodeSource, Trie, TrieResult};

/// Resolves trie nodes from the state's own persisted-node overlay before falling through to
/// the backing provider. The overlay carries nodes persisted by this state instance that the
/// caller may not have flushed to the store yet.
#[derive(Debug, Clone, Copy)]
struct StateNodes<'a, P> {
    overlay: &'a HashMap<B256, Vec<u8>>,
    provider: &'a P,
}

impl<P: StateProvider> NodeSource for StateNodes<'_, P> {
    fn node(&self, hash: B256) -> TrieResult<Vec<u8>> {
        match self.overlay.get(&hash) {
            Some(raw) => Ok(raw.clone()),
            None => self.provider.trie_node(hash),
        }
    }
}

/// The world state: an account cache with pending storage writes over the committed state
/// trie, plus the per-transaction warm sets and the snapshot journal.
///
/// Reads fall through the caches to the committed trie at `root`. Mutations are journaled so
/// that [State::revert] can restore any earlier [Snapshot] in O(changes-since). Nothing
/// reaches the backing store until [State::persist] drains the dirty caches into a
/// [StateCommit], which the block applier folds into its atomic batch.
#[derive(Debug)]
pub struct State<P> {
    provider: P,
    /// The committed world-state root, advanced by [State::persist].
    root: B256,
    /// Current account view. `None` marks a deleted or absent account.
    accounts: HashMap<Address, Option<TrieAccount>>,
    /// Account values as of the last persist, for dirty detection.
    loaded: HashMap<Address, Option<TrieAccount>>,
    /// Pending storage writes since the last persist.
    storage: HashMap<Address, HashMap<U256, U256>>,
    /// Code blobs, both cached reads and pending writes.
    codes: HashMap<B256, Bytes>,
    /// Code blobs written since the last persist.
    pending_codes: HashSet<B256>,
    /// EIP-2929 warm address set. Lives for one transaction.
    warm_addresses: HashSet<Address>,
    /// EIP-2929 warm (address, slot) set. Lives for one transaction.
    warm_slots: HashSet<(Address, U256)>,
    /// EIP-161 touched set. Lives for one transaction.
    touched: HashSet<Address>,
    /// Storage values at transaction start, recorded on first write. Backs net SSTORE
    /// metering.
    tx_original_storage: HashMap<(Address, U256), U256>,
    /// Nodes persisted by this instance, readable before the caller flushes them to the
    /// store.
    persisted_nodes: HashMap<B256, Vec<u8>>,
    journal: Vec<JournalEntry>,
    checkpoints: Vec<usize>,
}

impl<P: StateProvider> State<P> {
    /// Creates a state view over `provider` rooted at the committed `root`.
    pub fn new(root: B256, provider: P) -> Self {
        Self {
            provider,
            root,
            accounts: HashMap::new(),
            loaded: HashMap::new(),
            storage: HashMap::new(),
            codes: HashMap::new(),
            pending_codes: HashSet::new(),
            warm_addresses: HashSet::new(),
            warm_slots: HashSet::new(),
            touched: HashSet::new(),
            tx_original_storage: HashMap::new(),
            persisted_nodes: HashMap::new(),
            journal: Vec::new(),
            checkpoints: Vec::new(),
        }
    }

    fn nodes(&self) -> StateNodes<'_, P> {
        StateNodes { overlay: &self.persisted_nodes, provider: &self.provider }
    }

    /// The committed world-state root, as of the last [State::persist].
    pub const fn committed_root(&self) -> B256 {
        self.root
    }

    //
    // Accounts
    //

    /// Returns the account at `address`, if it exists.
    pub fn get_account(&mut self, address: Address) -> StateResult<Option<TrieAccount>> {
        self.load_account(address)
    }

    /// Replaces the account record at `address`.
    pub fn set_account(&mut self, address: Address, account: TrieAccount) -> StateResult<()> {
        self.load_account(address)?;
        self.write_account(address, Some(account));
        Ok(())
    }

    /// Returns `true` if an account record exists at `address`.
    pub fn account_exists(&mut self, address: Address) -> StateResult<bool> {
        Ok(self.load_account(address)?.is_some())
    }

    /// Returns `true` if the account is empty per EIP-161. Absent accounts are empty.
    pub fn account_is_empty(&mut self, address: Address) -> StateResult<bool> {
        Ok(self.load_account(address)?.map_or(true, |account| account.is_empty()))
    }

    /// Returns `true` if the account has code or a non-zero nonce.
    pub fn has_code_or_nonce(&mut self, address: Address) -> StateResult<bool> {
        Ok(self.load_account(address)?.is_some_and(|account| account.has_code_or_nonce()))
    }

    /// Marks `address` as touched. Touched accounts that end the transaction empty are
    /// deleted per EIP-161.
    pub fn touch_account(&mut self, address: Address) {
        if self.touched.insert(address) {
            self.journal.push(JournalEntry::Touch { address });
        }
    }

    /// The addresses touched so far in this transaction.
    pub fn touched_accounts(&self) -> Vec<Address> {
        self.touched.iter().copied().collect()
    }

    /// Deletes the account at `address` along with its pending storage writes.
    pub fn delete_account(&mut self, address: Address) -> StateResult<()> {
        self.load_account(address)?;
        self.write_account(address, None);
        let prev = self.storage.remove(&address).unwrap_or_default();
        self.journal.push(JournalEntry::StorageWipe { address, prev });
        Ok(())
    }

    //
    // Balance and nonce
    //

    /// Returns the balance of `address`. Zero for absent accounts.
    pub fn get_balance(&mut self, address: Address) -> StateResult<U256> {
        Ok(self.load_account(address)?.map_or(U256::ZERO, |account| account.balance))
    }

    /// Sets the balance of `address`, creating the account if absent.
    pub fn set_balance(&mut self, address: Address, balance: U256) -> StateResult<()> {
        let mut account = self.load_account(address)?.unwrap_or_default();
        account.balance = balance;
        self.write_account(address, Some(account));
        Ok(())
    }

    /// Adjusts the balance of `address` by `delta`, creating the account if absent.
    pub fn delta_balance(&mut self, address: Address, delta: i128) -> StateResult<()> {
        let balance = self.get_balance(address)?;
        let new_balance = if delta.is_negative() {
            balance.saturating_sub(U256::from(delta.unsigned_abs()))
        } else {
            balance.saturating_add(U256::from(delta.unsigned_abs()))
        };
        self.set_balance(address, new_balance)
    }

    /// Returns the nonce of `address`. Zero for absent accounts.
    pub fn get_nonce(&mut self, address: Address) -> StateResult<u64> {
        Ok(self.load_account(address)?.map_or(0, |account| account.nonce))
    }

    /// Increments the nonce of `address`, creating the account if absent.
    pub fn increment_nonce(&mut self, address: Address) -> StateResult<()> {
        let mut account = self.load_account(address)?.unwrap_or_default();
        account.nonce += 1;
        self.write_account(address, Some(account));
        Ok(())
    }

    //
    // Code
    //

    /// Returns the code hash of `address`. [KECCAK_EMPTY] for accounts without code.
    pub fn get_code_hash(&mut self, address: Address) -> StateResult<B256> {
        Ok(self.load_account(address)?.map_or(KECCAK_EMPTY, |account| account.code_hash))
    }

    /// Returns the bytecode of `address`. Empty for accounts without code.
    pub fn get_code(&mut self, address: Address) -> StateResult<Bytes> {
        let code_hash = self.get_code_hash(address)?;
        if code_hash == KECCAK_EMPTY {
            return Ok(Bytes::new());
        }
        if let Some(code) = self.codes.get(&code_hash) {
            return Ok(code.clone());
        }
        let code =
            self.provider.bytecode(code_hash)?.ok_or(StateError::MissingCode(code_hash))?;
        self.codes.insert(code_hash, code.clone());
        Ok(code)
    }

    /// Installs `code` at `address`, creating the account if absent.
    pub fn set_code(&mut self, address: Address, code: Bytes) -> StateResult<()> {
        let code_hash = keccak256(&code);
        self.codes.insert(code_hash, code);
        self.pending_codes.insert(code_hash);

        let mut account = self.load_account(address)?.unwrap_or_default();
        account.code_hash = code_hash;
        self.write_account(address, Some(account));
        Ok(())
    }

    //
    // Storage
    //

    /// Returns the value of `slot` under `address`. Zero when unset.
    pub fn get_storage(&mut self, address: Address, slot: U256) -> StateResult<U256> {
        if let Some(value) = self.storage.get(&address).and_then(|writes| writes.get(&slot)) {
            return Ok(*value);
        }
        self.committed_storage(address, slot)
    }

    /// Returns the value `slot` held at the start of the current transaction.
    pub fn get_original_storage(&mut self, address: Address, slot: U256) -> StateResult<U256> {
        if let Some(value) = self.tx_original_storage.get(&(address, slot)) {
            return Ok(*value);
        }
        self.get_storage(address, slot)
    }

    /// Sets `slot` under `address` to `value`.
    pub fn set_storage(&mut self, address: Address, slot: U256, value: U256) -> StateResult<()> {
        let current = self.get_storage(address, slot)?;
        self.tx_original_storage.entry((address, slot)).or_insert(current);

        let writes = self.storage.entry(address).or_default();
        let prev = writes.insert(slot, value);
        self.journal.push(JournalEntry::Storage { address, slot, prev });
        Ok(())
    }

    /// Reads `slot` from the committed storage trie of `address`.
    fn committed_storage(&mut self, address: Address, slot: U256) -> StateResult<U256> {
        let Some(account) = self.load_account(address)? else {
            return Ok(U256::ZERO);
        };
        let trie = Trie::new(account.storage_root, self.nodes());
        let key = keccak256(slot.to_be_bytes::<32>());
        match trie.get(key.as_slice())? {
            Some(raw) => Ok(U256::decode(&mut raw.as_slice())
                .map_err(veda_trie::TrieError::Rlp)?),
            None => Ok(U256::ZERO),
        }
    }

    //
    // Warm access sets (EIP-2929)
    //

    /// Marks `address` warm, returning `true` if it was previously cold.
    pub fn mark_address_warm(&mut self, address: Address) -> bool {
        let was_cold = self.warm_addresses.insert(address);
        if was_cold {
            self.journal.push(JournalEntry::WarmAddress { address });
        }
        was_cold
    }

    /// Returns `true` if `address` has been accessed in this transaction.
    pub fn is_address_warm(&self, address: Address) -> bool {
        self.warm_addresses.contains(&address)
    }

    /// Marks `(address, slot)` warm, returning `true` if it was previously cold.
    pub fn mark_storage_warm(&mut self, address: Address, slot: U256) -> bool {
        let was_cold = self.warm_slots.insert((address, slot));
        if was_cold {
            self.journal.push(JournalEntry::WarmSlot { address, slot });
        }
        was_cold
    }

    /// Returns `true` if `(address, slot)` has been accessed in this transaction.
    pub fn is_storage_warm(&self, address: Address, slot: U256) -> bool {
        self.warm_slots.contains(&(address, slot))
    }

    //
    // Snapshots
    //

    /// Takes a snapshot of the current state.
    pub fn snapshot(&mut self) -> Snapshot {
        self.checkpoints.push(self.journal.len());
        Snapshot { journal_len: self.journal.len(), depth: self.checkpoints.len() }
    }

    /// Merges everything above `snapshot` into the next lower layer.
    pub fn commit(&mut self, snapshot: Snapshot) -> StateResult<()> {
        self.resolve_snapshot(snapshot)?;
        Ok(())
    }

    /// Discards every change made since `snapshot`.
    pub fn revert(&mut self, snapshot: Snapshot) -> StateResult<()> {
        self.resolve_snapshot(snapshot)?;
        while self.journal.len() > snapshot.journal_len {
            let entry = self.journal.pop().expect("journal length checked");
            self.undo(entry);
        }
        Ok(())
    }

    fn resolve_snapshot(&mut self, snapshot: Snapshot) -> StateResult<()> {
        if self.checkpoints.len() != snapshot.depth ||
            self.checkpoints.last() != Some(&snapshot.journal_len)
        {
            return Err(StateError::InvalidSnapshot);
        }
        self.checkpoints.pop();
        Ok(())
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::Account { address, prev } => match prev {
                Some(prev) => {
                    self.accounts.insert(address, prev);
                }
                None => {
                    self.accounts.remove(&address);
                }
            },
            JournalEntry::Storage { address, slot, prev } => {
                let writes = self.storage.entry(address).or_default();
                match prev {
                    Some(prev) => {
                        writes.insert(slot, prev);
                    }
                    None => {
                        writes.remove(&slot);
                    }
                }
            }
            JournalEntry::StorageWipe { address, prev } => {
                self.storage.insert(address, prev);
            }
            JournalEntry::WarmAddress { address } => {
                self.warm_addresses.remove(&address);
            }
            JournalEntry::WarmSlot { address, slot } => {
                self.warm_slots.remove(&(address, slot));
            }
            JournalEntry::Touch { address } => {
                self.touched.remove(&address);
            }
        }
    }

    /// Resets the per-transaction tracking: warm sets, touched set, original-storage records,
    /// and the journal. Called between transactions; block-scoped dirty caches survive.
    pub fn reset_transaction(&mut self) {
        debug_assert!(self.checkpoints.is_empty(), "unresolved snapshots at tx boundary");
        self.warm_addresses.clear();
        self.warm_slots.clear();
        self.touched.clear();
        self.tx_original_storage.clear();
        self.journal.clear();
        self.checkpoints.clear();
    }

    //
    // Persistence
    //

    /// Computes the world-state root the dirty caches would persist to, without persisting.
    pub fn make_state_root(&self) -> StateResult<B256> {
        Ok(self.compute_commit()?.0.state_root)
    }

    /// Drains every dirty account, storage write, and code blob into a [StateCommit] and
    /// advances the committed root. The caller folds the commit into the block's atomic KV
    /// batch.
    pub fn persist(&mut self) -> StateResult<StateCommit> {
        let (commit, reencoded) = self.compute_commit()?;

        self.root = commit.state_root;
        // Account records now carry their post-commit storage roots.
        for (address, account) in reencoded {
            self.accounts.insert(address, account);
        }
        self.loaded = self.accounts.clone();
        self.storage.clear();
        self.pending_codes.clear();
        self.persisted_nodes.extend(commit.trie_nodes.clone());

        trace!(
            target: "state",
            state_root = %commit.state_root,
            accounts = commit.witness.accounts,
            slots = commit.witness.slots,
            codes = commit.witness.codes,
            "Persisted world state",
        );

        Ok(commit)
    }

    #[allow(clippy::type_complexity)]
    fn compute_commit(
        &self,
    ) -> StateResult<(StateCommit, Vec<(Address, Option<TrieAccount>)>)> {
        let mut world = Trie::new(self.root, self.nodes());
        let mut trie_nodes: HashMap<B256, Vec<u8>> = HashMap::new();
        let mut witness = StateWitness::default();
        let mut reencoded = Vec::new();

        // Dirty means the record differs from its as-loaded value or has pending storage.
        let mut dirty: BTreeSet<Address> = self.storage.keys().copied().collect();
        dirty.extend(
            self.accounts
                .iter()
                .filter(|(address, current)| {
                    self.loaded.get(*address).map_or(true, |loaded| loaded != *current)
                })
                .map(|(address, _)| *address),
        );

        for address in dirty {
            let path = keccak256(address);
            match self.accounts.get(&address).copied().flatten() {
                None => {
                    // Deleted (or never-existing) account: remove any committed record.
                    // Pending storage writes for an absent account die with it.
                    if self.loaded.get(&address).copied().flatten().is_some() {
                        world.delete(path.as_slice())?;
                        witness.accounts += 1;
                    }
                    reencoded.push((address, None));
                }
                Some(mut account) => {
                    if let Some(writes) = self.storage.get(&address) {
                        let mut storage_trie =
                            Trie::new(account.storage_root, self.nodes());
                        for (slot, value) in writes {
                            let key = keccak256(slot.to_be_bytes::<32>());
                            if value.is_zero() {
                                storage_trie.delete(key.as_slice())?;
                            } else {
                                storage_trie
                                    .insert(key.as_slice(), alloy_rlp::encode(value))?;
                            }
                            witness.slots += 1;
                        }
                        account.storage_root = storage_trie.root();
                        trie_nodes.extend(storage_trie.take_writes());
                    }
                    world.insert(path.as_slice(), alloy_rlp::encode(account))?;
                    witness.accounts += 1;
                    reencoded.push((address, Some(account)));
                }
            }
        }

        let state_root = world.root();
        trie_nodes.extend(world.take_writes());
        witness.trie_nodes = trie_nodes.keys().copied().collect();

        let codes: Vec<(B256, Bytes)> = self
            .pending_codes
            .iter()
            .filter_map(|hash| self.codes.get(hash).map(|code| (*hash, code.clone())))
            .collect();
        witness.codes = codes.len();

        Ok((StateCommit { state_root, trie_nodes, codes, witness }, reencoded))
    }

    //
    // Internal cache plumbing
    //

    fn load_account(&mut self, address: Address) -> StateResult<Option<TrieAccount>> {
        if let Some(entry) = self.accounts.get(&address) {
            return Ok(*entry);
        }

        let world = Trie::new(self.root, self.nodes());
        let fetched = match world.get(keccak256(address).as_slice())? {
            Some(raw) => Some(
                TrieAccount::decode(&mut raw.as_slice())
                    .map_err(veda_trie::TrieError::Rlp)?,
            ),
            None => None,
        };

        self.accounts.insert(address, fetched);
        self.loaded.insert(address, fetched);
        Ok(fetched)
    }

    fn write_account(&mut self, address: Address, account: Option<TrieAccount>) {
        let prev = self.accounts.get(&address).copied();
        self.journal.push(JournalEntry::Account { address, prev });
        self.accounts.insert(address, account);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryStateProvider;
    use alloy_trie::EMPTY_ROOT_HASH;

    fn state() -> State<MemoryStateProvider> {
        State::new(EMPTY_ROOT_HASH, MemoryStateProvider::new())
    }

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_lazy_account_creation() {
        let mut state = state();
        assert!(!state.account_exists(addr(1)).unwrap());
        assert_eq!(state.get_nonce(addr(1)).unwrap(), 0);

        state.increment_nonce(addr(1)).unwrap();
        assert!(state.account_exists(addr(1)).unwrap());
        assert_eq!(state.get_nonce(addr(1)).unwrap(), 1);
    }

    #[test]
    fn test_snapshot_revert_rolls_back_everything() {
        let mut state = state();
        state.increment_nonce(addr(1)).unwrap();
        state.set_storage(addr(1), U256::from(5), U256::from(50)).unwrap();

        let snapshot = state.snapshot();
        state.increment_nonce(addr(1)).unwrap();
        state.set_storage(addr(1), U256::from(5), U256::from(99)).unwrap();
        state.mark_address_warm(addr(2));
        state.mark_storage_warm(addr(2), U256::from(7));
        state.touch_account(addr(2));
        state.revert(snapshot).unwrap();

        assert_eq!(state.get_nonce(addr(1)).unwrap(), 1);
        assert_eq!(state.get_storage(addr(1), U256::from(5)).unwrap(), U256::from(50));
        assert!(!state.is_address_warm(addr(2)));
        assert!(!state.is_storage_warm(addr(2), U256::from(7)));
        assert!(state.touched_accounts().is_empty());
    }

    #[test]
    fn test_commit_keeps_changes() {
        let mut state = state();
        let snapshot = state.snapshot();
        state.set_storage(addr(1), U256::from(1), U256::from(2)).unwrap();
        state.commit(snapshot).unwrap();

        assert_eq!(state.get_storage(addr(1), U256::from(1)).unwrap(), U256::from(2));
    }

    #[test]
    fn test_nested_snapshots_resolve_lifo() {
        let mut state = state();
        let outer = state.snapshot();
        state.increment_nonce(addr(1)).unwrap();
        let inner = state.snapshot();
        state.increment_nonce(addr(1)).unwrap();

        // Resolving the outer snapshot before the inner one is a usage error.
        assert_eq!(state.commit(outer), Err(StateError::InvalidSnapshot));

        state.revert(inner).unwrap();
        state.commit(outer).unwrap();
        assert_eq!(state.get_nonce(addr(1)).unwrap(), 1);
    }

    #[test]
    fn test_nested_frames_see_parent_writes() {
        let mut state = state();
        let outer = state.snapshot();
        state.set_storage(addr(1), U256::from(1), U256::from(10)).unwrap();

        let inner = state.snapshot();
        assert_eq!(state.get_storage(addr(1), U256::from(1)).unwrap(), U256::from(10));
        state.commit(inner).unwrap();
        state.commit(outer).unwrap();
    }

    #[test]
    fn test_persist_roundtrip() {
        let mut provider = MemoryStateProvider::new();
        let commit = {
            let mut state = State::new(EMPTY_ROOT_HASH, provider.clone());
            state.increment_nonce(addr(1)).unwrap();
            state.set_code(addr(1), Bytes::from_static(&[0x60, 0x00])).unwrap();
            state.set_storage(addr(1), U256::from(3), U256::from(7)).unwrap();
            state.persist().unwrap()
        };
        provider.extend_nodes(commit.trie_nodes.clone());
        for (hash, code) in &commit.codes {
            assert_eq!(*hash, keccak256(code));
            provider.insert_code(code.clone());
        }

        let mut reopened = State::new(commit.state_root, provider);
        assert_eq!(reopened.get_nonce(addr(1)).unwrap(), 1);
        assert_eq!(reopened.get_code(addr(1)).unwrap(), Bytes::from_static(&[0x60, 0x00]));
        assert_eq!(reopened.get_storage(addr(1), U256::from(3)).unwrap(), U256::from(7));
        assert!(commit.witness.accounts >= 1);
        assert_eq!(commit.witness.slots, 1);
        assert_eq!(commit.witness.codes, 1);
    }

    #[test]
    fn test_reverted_changes_do_not_move_the_root() {
        let mut state = state();
        state.increment_nonce(addr(1)).unwrap();
        let baseline = state.make_state_root().unwrap();

        let snapshot = state.snapshot();
        state.set_storage(addr(1), U256::from(1), U256::from(1)).unwrap();
        state.increment_nonce(addr(2)).unwrap();
        state.revert(snapshot).unwrap();

        assert_eq!(state.make_state_root().unwrap(), baseline);
    }

    #[test]
    fn test_warm_marking_is_cold_once() {
        let mut state = state();
        assert!(state.mark_address_warm(addr(1)));
        assert!(!state.mark_address_warm(addr(1)));
        assert!(state.mark_storage_warm(addr(1), U256::from(1)));
        assert!(!state.mark_storage_warm(addr(1), U256::from(1)));

        state.reset_transaction();
        assert!(state.mark_address_warm(addr(1)));
    }

    #[test]
    fn test_delete_account_wipes_storage() {
        let mut state = state();
        state.increment_nonce(addr(1)).unwrap();
        state.set_storage(addr(1), U256::from(1), U256::from(9)).unwrap();
        state.delete_account(addr(1)).unwrap();

        assert!(!state.account_exists(addr(1)).unwrap());
        assert_eq!(state.get_storage(addr(1), U256::from(1)).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_original_storage_survives_rewrites() {
        let mut state = state();
        state.increment_nonce(addr(1)).unwrap();
        state.set_storage(addr(1), U256::from(1), U256::from(5)).unwrap();
        state.persist().unwrap();
        state.reset_transaction();

        // Committed value is 5; two writes within the next tx keep the original at 5.
        state.set_storage(addr(1), U256::from(1), U256::from(6)).unwrap();
        state.set_storage(addr(1), U256::from(1), U256::from(7)).unwrap();
        assert_eq!(
            state.get_original_storage(addr(1), U256::from(1)).unwrap(),
            U256::from(5)
        );
        assert_eq!(state.get_storage(addr(1), U256::from(1)).unwrap(), U256::from(7));
    }

    #[test]
    fn test_storage_slot_clear_prunes_trie() {
        let mut state = state();
        state.increment_nonce(addr(1)).unwrap();
        let empty_root = state.make_state_root().unwrap();

        state.set_storage(addr(1), U256::from(1), U256::from(9)).unwrap();
        assert_ne!(state.make_state_root().unwrap(), empty_root);

        state.set_storage(addr(1), U256::from(1), U256::ZERO).unwrap();
        assert_eq!(state.make_state_root().unwrap(), empty_root);
    }
}
