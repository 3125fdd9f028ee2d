//! The internal sync RPC: the single write entry point by which the verifier drives block
//! production.

use crate::{
    errors::{into_rpc_err, RpcError},
    events::{unix_now, ChainEvent},
    node::NodeHandle,
    types::{parse_address, parse_hash, parse_hex_bytes, LatestBlock, SyncBlockModel,
        SyncTransactionModel},
};
use alloy_primitives::Bytes;
use jsonrpsee::{
    core::{async_trait, RpcResult},
    proc_macros::rpc,
};
use tracing::{debug, error, info};
use veda_executor::{BlockDescriptor, BlockExecutor};
use veda_primitives::Transaction;

/// The sync RPC surface.
#[rpc(server)]
pub trait SyncApi {
    /// Applies a verifier-ordered block: validates the descriptor, executes the
    /// transactions, seals, and persists. Returns `null` on success.
    #[method(name = "sync")]
    async fn sync(
        &self,
        block: SyncBlockModel,
        transactions: Vec<SyncTransactionModel>,
    ) -> RpcResult<()>;

    /// Returns the canonical tip descriptor.
    #[method(name = "get_latest_block")]
    async fn get_latest_block(&self) -> RpcResult<LatestBlock>;
}

/// The sync RPC implementation.
#[derive(Debug)]
pub struct SyncRpc {
    node: NodeHandle,
}

impl SyncRpc {
    /// Creates the sync surface over `node`.
    pub const fn new(node: NodeHandle) -> Self {
        Self { node }
    }

    /// Validates the descriptor against the pending header and parses it.
    fn parse_descriptor(
        block: &SyncBlockModel,
        pending_number: u64,
        parent_timestamp: u64,
    ) -> Result<BlockDescriptor, RpcError> {
        if block.block_number != pending_number {
            return Err(RpcError::InvalidParams(format!(
                "this node must only work on block #{pending_number}, but the target \
                 descriptor has block #{}",
                block.block_number
            )));
        }
        let block_hash = parse_hash(&block.block_hash).ok_or_else(|| {
            RpcError::InvalidParams(format!("invalid block hash: {}", block.block_hash))
        })?;
        let mix_hash = parse_hash(&block.mix_hash).ok_or_else(|| {
            RpcError::InvalidParams(format!("invalid mix hash: {}", block.mix_hash))
        })?;
        if block.timestamp <= parent_timestamp {
            return Err(RpcError::InvalidParams(format!(
                "timestamp {} does not advance past the parent's {parent_timestamp}",
                block.timestamp
            )));
        }
        Ok(BlockDescriptor {
            block_hash,
            block_number: block.block_number,
            mix_hash,
            timestamp: block.timestamp,
        })
    }

    /// Parses and validates the transaction list. Transactions with undecodable data or a
    /// malformed target are dropped silently; malformed sender or hash fields abort the
    /// call.
    fn parse_transactions(
        transactions: &[SyncTransactionModel],
        gas_limit: u64,
    ) -> Result<Vec<Transaction>, RpcError> {
        let mut parsed = Vec::with_capacity(transactions.len());
        for (index, tx) in transactions.iter().enumerate() {
            let sender = parse_address(&tx.sender).ok_or_else(|| {
                RpcError::InvalidParams(format!("invalid sender address: {}", tx.sender))
            })?;
            let tx_hash = parse_hash(&tx.tx_hash).ok_or_else(|| {
                RpcError::InvalidParams(format!("invalid tx hash: {}", tx.tx_hash))
            })?;

            let Some(data) = parse_hex_bytes(&tx.data) else {
                error!(target: "sync_rpc", index, sender = %tx.sender, "Invalid transaction data");
                continue;
            };
            let to = match tx.to.as_str() {
                "" | "0x" => None,
                raw => match parse_address(raw) {
                    Some(to) => Some(to),
                    None => {
                        debug!(target: "sync_rpc", index, to = raw, "Invalid transaction target");
                        continue;
                    }
                },
            };

            parsed.push(Transaction {
                nonce: tx.nonce,
                gas: gas_limit,
                to,
                data: Bytes::from(data),
                veda_sender: sender,
                veda_txhash: tx_hash,
            });
        }
        Ok(parsed)
    }

    async fn import_block(
        &self,
        block: SyncBlockModel,
        transactions: Vec<SyncTransactionModel>,
    ) -> Result<(), RpcError> {
        let mut executor = self.node.executor.lock().await;

        let pending_number = executor.pending_header().block_number;
        let parent_timestamp = executor.parent().timestamp;
        let gas_limit = executor.pending_header().gas_limit;

        let descriptor = Self::parse_descriptor(&block, pending_number, parent_timestamp)?;
        let applying = Self::parse_transactions(&transactions, gas_limit)?;

        debug!(target: "sync_rpc", block_number = descriptor.block_number, "Syncing block");

        match executor.execute_block(&descriptor, applying) {
            Ok((sealed, receipts, _)) => {
                debug!(
                    target: "sync_rpc",
                    block_number = sealed.header.block_number,
                    block_hash = %sealed.hash(),
                    tx_count = sealed.transactions.len(),
                    receipt_count = receipts.len(),
                    "Block imported",
                );
                Ok(())
            }
            Err(err) => {
                // The executor's pending block is poisoned; rebuild it on the old tip.
                match BlockExecutor::new(self.node.db.clone()) {
                    Ok(rebuilt) => *executor = rebuilt,
                    Err(rebuild_err) => {
                        error!(target: "sync_rpc", %rebuild_err, "Failed to rebuild executor");
                    }
                }
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl SyncApiServer for SyncRpc {
    async fn sync(
        &self,
        block: SyncBlockModel,
        transactions: Vec<SyncTransactionModel>,
    ) -> RpcResult<()> {
        self.node.events.broadcast(ChainEvent::NewBlockImportStarted { timestamp: unix_now() });
        self.node.gate.block();

        let result = self.import_block(block, transactions).await;

        match result {
            Ok(()) => {
                self.node
                    .events
                    .broadcast(ChainEvent::NewBlockImportFinished { timestamp: unix_now() });
                self.node.gate.resume();
                Ok(())
            }
            Err(err) => {
                info!(target: "sync_rpc", %err, "Block import canceled");
                self.node.events.broadcast(ChainEvent::NewBlockImportCanceled {
                    timestamp: unix_now(),
                    reason: err.to_string(),
                });
                self.node.gate.resume();
                Err(into_rpc_err(err))
            }
        }
    }

    async fn get_latest_block(&self) -> RpcResult<LatestBlock> {
        let head = self.node.head().map_err(into_rpc_err)?;
        Ok(LatestBlock {
            veda_block_hash: crate::types::hex_bytes(head.veda_block_hash.as_slice()),
            veda_block_number: head.veda_block_number,
            veda_timestamp: head.veda_timestamp,
        })
    }
}
