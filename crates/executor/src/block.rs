//! The block applier: sequential transaction application, header sealing, validation, and
//! atomic persistence.

use crate::{
    chaindb::ChainDb,
    errors::{ExecutorError, ExecutorResult},
    execute::{execute_transaction, TxError},
    validation::validate_block,
};
use alloy_primitives::{Bloom, B256};
use tracing::{debug, info};
use veda_evm::{BlockEnv, Computation};
use veda_kv::KvBatch;
use veda_primitives::{constants::VEDA_CHAIN_ID, Block, Header, Receipt, SealedBlock, SealedHeader, Transaction};
use veda_state::{State, StateCommit};
use veda_trie::ordered_trie_root;

/// The block identity and environment assigned by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// The block's identity.
    pub block_hash: B256,
    /// The block's number.
    pub block_number: u64,
    /// The mix hash exposed to PREVRANDAO.
    pub mix_hash: B256,
    /// The block's timestamp.
    pub timestamp: u64,
}

/// Applies verifier-ordered blocks against the canonical tip.
///
/// One executor instance owns the write path: transactions execute sequentially against a
/// state rooted at the parent's state root, the header is sealed with the verifier-assigned
/// identity, validated, and persisted. Trie nodes, code, header, body, receipts, and
/// indexes all land in one atomic batch.
#[derive(Debug)]
pub struct BlockExecutor {
    db: ChainDb,
    parent: SealedHeader,
    pending: Header,
    state: State<ChainDb>,
    block_env: BlockEnv,
    applied: Vec<Transaction>,
    receipts: Vec<Receipt>,
    computations: Vec<Computation>,
    cumulative_gas: u64,
    built_header: Option<Header>,
    commit: Option<StateCommit>,
}

impl BlockExecutor {
    /// Creates an executor positioned on the canonical tip.
    pub fn new(db: ChainDb) -> ExecutorResult<Self> {
        let parent = db.canonical_head()?;
        let pending = Header::pending_from_parent(&parent);
        let state = State::new(parent.state_root, db.clone());
        let block_env = Self::block_env(&db, &parent, &pending)?;
        Ok(Self {
            db,
            parent,
            pending,
            state,
            block_env,
            applied: Vec::new(),
            receipts: Vec::new(),
            computations: Vec::new(),
            cumulative_gas: 0,
            built_header: None,
            commit: None,
        })
    }

    /// The header of the block currently being built.
    pub const fn pending_header(&self) -> &Header {
        &self.pending
    }

    /// The canonical tip this executor extends.
    pub const fn parent(&self) -> &SealedHeader {
        &self.parent
    }

    /// A handle to the chain database.
    pub const fn db(&self) -> &ChainDb {
        &self.db
    }

    /// Executes a full verifier-supplied block: stamps the descriptor into the pending
    /// environment, applies the transactions, seals, validates, and persists.
    pub fn execute_block(
        &mut self,
        descriptor: &BlockDescriptor,
        transactions: Vec<Transaction>,
    ) -> ExecutorResult<(SealedBlock, Vec<Receipt>, Vec<Computation>)> {
        self.configure(descriptor);
        self.apply_transactions(transactions)?;
        let computations = core::mem::take(&mut self.computations);
        let (block, receipts) = self.mine_block(descriptor)?;
        Ok((block, receipts, computations))
    }

    /// Stamps the descriptor's execution-visible fields into the pending header so that
    /// TIMESTAMP and PREVRANDAO observe the sealed values.
    fn configure(&mut self, descriptor: &BlockDescriptor) {
        self.pending.timestamp = descriptor.timestamp;
        self.pending.mix_hash = descriptor.mix_hash;
        self.block_env.timestamp = descriptor.timestamp;
        self.block_env.mix_hash = descriptor.mix_hash;
    }

    /// Applies `transactions` in order against the pending block, accumulating receipts and
    /// cumulative gas. Transactions failing validation are dropped silently; the rest of the
    /// block continues.
    pub fn apply_transactions(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> ExecutorResult<(Block, Vec<Receipt>, Vec<Computation>)> {
        info!(
            target: "executor",
            block_number = self.pending.block_number,
            tx_count = transactions.len(),
            gas_limit = self.pending.gas_limit,
            "Executing block",
        );

        for tx in transactions {
            match execute_transaction(&mut self.state, &self.block_env, &tx, self.cumulative_gas)
            {
                Ok(outcome) => {
                    debug!(
                        target: "executor",
                        tx_hash = %tx.hash(),
                        gas_used = outcome.gas_used,
                        success = outcome.computation.is_success(),
                        "Transaction executed",
                    );
                    self.cumulative_gas += outcome.gas_used;
                    self.applied.push(tx);
                    self.receipts.push(outcome.receipt);
                    self.computations.push(outcome.computation);
                }
                Err(TxError::Validation(err)) => {
                    debug!(target: "executor", tx_hash = %tx.hash(), %err, "Dropping transaction");
                }
                Err(TxError::State(err)) => return Err(ExecutorError::State(err)),
            }
        }

        // Persist the state into the commit buffer to learn the new state root.
        let commit = self.state.persist()?;

        let mut header = self.pending.clone();
        header.state_root = commit.state_root;
        header.transaction_root = ordered_trie_root(&self.applied)?;
        header.receipt_root = ordered_trie_root(&self.receipts)?;
        header.bloom = self
            .receipts
            .iter()
            .fold(Bloom::default(), |bloom, receipt| bloom | receipt.bloom);
        header.gas_used = self.cumulative_gas;

        self.commit = Some(commit);
        self.built_header = Some(header.clone());

        Ok((
            Block { header, transactions: self.applied.clone() },
            self.receipts.clone(),
            self.computations.clone(),
        ))
    }

    /// Seals the built block with the verifier-assigned identity, validates it, and writes
    /// it in one atomic batch: state, header, body, receipts, indexes, canonical pointer.
    pub fn mine_block(
        &mut self,
        descriptor: &BlockDescriptor,
    ) -> ExecutorResult<(SealedBlock, Vec<Receipt>)> {
        let mut header = match self.built_header.take() {
            Some(header) => header,
            // Mining without applying first seals an empty block.
            None => {
                self.apply_transactions(Vec::new())?;
                self.built_header.take().expect("apply_transactions builds the header")
            }
        };

        header.timestamp = descriptor.timestamp;
        header.mix_hash = descriptor.mix_hash;
        header.veda_block_hash = descriptor.block_hash;
        header.veda_block_number = descriptor.block_number;
        header.veda_timestamp = descriptor.timestamp;

        let commit = self.commit.take().unwrap_or_default();
        let sealed = SealedBlock {
            header: header.seal(),
            transactions: core::mem::take(&mut self.applied),
        };
        let receipts = core::mem::take(&mut self.receipts);

        validate_block(&self.db, &self.parent, &sealed, &receipts, commit.state_root)?;

        let mut batch = KvBatch::new();
        ChainDb::stage_state(&mut batch, &commit);
        ChainDb::stage_block(&mut batch, &sealed.header, &sealed.transactions, &receipts);
        self.db.write_batch(batch)?;

        info!(
            target: "executor",
            block_number = sealed.header.block_number,
            block_hash = %sealed.hash(),
            tx_count = sealed.transactions.len(),
            gas_used = sealed.header.gas_used,
            state_root = %sealed.header.state_root,
            "Sealed block",
        );

        // Advance onto the new tip.
        self.parent = sealed.header.clone();
        self.pending = Header::pending_from_parent(&self.parent);
        self.state = State::new(self.parent.state_root, self.db.clone());
        self.block_env = Self::block_env(&self.db, &self.parent, &self.pending)?;
        self.computations.clear();
        self.cumulative_gas = 0;

        Ok((sealed, receipts))
    }

    fn block_env(
        db: &ChainDb,
        parent: &SealedHeader,
        pending: &Header,
    ) -> ExecutorResult<BlockEnv> {
        let mut block_hashes = vec![parent.hash()];
        block_hashes.extend(db.ancestor_hashes(parent, 255)?);
        Ok(BlockEnv {
            number: pending.block_number,
            timestamp: pending.timestamp,
            gas_limit: pending.gas_limit,
            coinbase: pending.coinbase,
            mix_hash: pending.mix_hash,
            chain_id: VEDA_CHAIN_ID,
            block_hashes,
        })
    }
}
