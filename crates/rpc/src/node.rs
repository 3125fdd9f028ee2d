//! The shared node handle behind every RPC module.

use crate::{errors::RpcError, events::EventBus, gate::ImportGate};
use alloy_primitives::{B256, U256};
use std::sync::Arc;
use tokio::sync::Mutex;
use veda_executor::{BlockExecutor, ChainDb};
use veda_primitives::{constants::VEDA_CHAIN_ID, Receipt, SealedHeader, Transaction};

/// The default gas price reported by `eth_gasPrice`: one gwei. Gas is never actually
/// bought, so this is purely a wire-compatibility knob.
pub const DEFAULT_GAS_PRICE: u128 = 1_000_000_000;

/// Everything the RPC surface needs: the chain database for reads, the serialized block
/// executor for writes, the event bus, and the import gate.
#[derive(Debug)]
pub struct Node {
    /// The chain database.
    pub db: ChainDb,
    /// The block executor. Exactly one import runs at a time.
    pub executor: Mutex<BlockExecutor>,
    /// The block-import event bus.
    pub events: EventBus,
    /// The read-path import gate.
    pub gate: ImportGate,
    /// The gas price reported to clients.
    pub gas_price: U256,
    /// The chain id reported to clients.
    pub chain_id: u64,
}

/// A cloneable handle to the [Node].
pub type NodeHandle = Arc<Node>;

impl Node {
    /// Builds a node handle over an initialized chain.
    pub fn new(db: ChainDb, gas_price: U256) -> Result<NodeHandle, RpcError> {
        let executor = BlockExecutor::new(db.clone())?;
        Ok(Arc::new(Self {
            db,
            executor: Mutex::new(executor),
            events: EventBus::new(),
            gate: ImportGate::new(),
            gas_price,
            chain_id: VEDA_CHAIN_ID,
        }))
    }

    /// The canonical tip.
    pub fn head(&self) -> Result<SealedHeader, RpcError> {
        Ok(self.db.canonical_head()?)
    }

    /// Resolves a block tag or hex number to a canonical header.
    pub fn header_by_tag(&self, tag: Option<&str>) -> Result<SealedHeader, RpcError> {
        let tag = tag.unwrap_or("latest");
        match tag {
            "latest" | "pending" | "safe" | "finalized" => self.head(),
            "earliest" => self
                .db
                .canonical_header(0)?
                .ok_or_else(|| RpcError::NotFound("genesis block not found".to_string())),
            _ => {
                let number = crate::types::parse_hex_u64(tag)
                    .ok_or_else(|| RpcError::InvalidParams(format!("invalid block: {tag}")))?;
                self.db
                    .canonical_header(number)?
                    .ok_or_else(|| RpcError::NotFound(format!("block {number} not found")))
            }
        }
    }

    /// Resolves a block identity to its header.
    pub fn header_by_hash(&self, hash: B256) -> Result<SealedHeader, RpcError> {
        self.db
            .header(hash)?
            .ok_or_else(|| RpcError::NotFound(format!("block {hash} not found")))
    }

    /// The transactions and receipts of the block with the given identity.
    pub fn block_body(
        &self,
        hash: B256,
    ) -> Result<(Vec<Transaction>, Vec<Receipt>), RpcError> {
        let transactions = self.db.block_transactions(hash)?.unwrap_or_default();
        let receipts = self.db.block_receipts(hash)?.unwrap_or_default();
        Ok((transactions, receipts))
    }

    /// Looks up a canonical transaction with its enclosing header and position.
    pub fn canonical_transaction(
        &self,
        tx_hash: B256,
    ) -> Result<(SealedHeader, Transaction, u64), RpcError> {
        let location = self.db.transaction_location(tx_hash)?.ok_or_else(|| {
            RpcError::NotFound(format!(
                "Transaction {tx_hash} is not in the canonical chain"
            ))
        })?;
        let header = self
            .db
            .canonical_header(location.block_number)?
            .ok_or_else(|| RpcError::NotFound(format!("block {} not found", location.block_number)))?;
        let (transactions, _) = self.block_body(header.hash())?;
        let tx = transactions
            .into_iter()
            .nth(location.index as usize)
            .ok_or_else(|| RpcError::Internal("transaction index out of range".to_string()))?;
        Ok((header, tx, location.index))
    }
}
