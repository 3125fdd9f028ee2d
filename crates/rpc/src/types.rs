//! Wire types and formatters for the read and sync RPC surfaces.

use alloy_primitives::{hex, Address, Bloom, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use veda_primitives::{
    generate_contract_address, Block, Log, Receipt, SealedHeader, Transaction,
};

//
// Hex helpers
//

/// Formats an integer as a minimal 0x-prefixed hex string.
pub fn hex_u64(value: u64) -> String {
    format!("{value:#x}")
}

/// Formats a [U256] as a minimal 0x-prefixed hex string.
pub fn hex_u256(value: U256) -> String {
    format!("{value:#x}")
}

/// Formats bytes as a 0x-prefixed hex string.
pub fn hex_bytes(bytes: &[u8]) -> String {
    hex::encode_prefixed(bytes)
}

/// Parses a 0x-prefixed hex integer.
pub fn parse_hex_u64(value: &str) -> Option<u64> {
    let digits = value.strip_prefix("0x")?;
    u64::from_str_radix(digits, 16).ok()
}

/// Decodes 0x-prefixed hex bytes.
pub fn parse_hex_bytes(value: &str) -> Option<Vec<u8>> {
    hex::decode(value).ok()
}

/// Decodes a 32-byte 0x-prefixed hash.
pub fn parse_hash(value: &str) -> Option<B256> {
    let bytes = parse_hex_bytes(value)?;
    (bytes.len() == 32).then(|| B256::from_slice(&bytes))
}

/// Decodes a 20-byte 0x-prefixed address.
pub fn parse_address(value: &str) -> Option<Address> {
    let bytes = parse_hex_bytes(value)?;
    (bytes.len() == 20).then(|| Address::from_slice(&bytes))
}

fn hex_bloom(bloom: &Bloom) -> String {
    hex_bytes(bloom.as_slice())
}

//
// Sync surface
//

/// The block descriptor of a `sync` call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBlockModel {
    /// The sequencer-assigned block identity, 32 bytes of hex.
    pub block_hash: String,
    /// The decimal block number.
    pub block_number: u64,
    /// The mix hash, 32 bytes of hex.
    pub mix_hash: String,
    /// The block timestamp.
    pub timestamp: u64,
}

/// One transaction of a `sync` call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTransactionModel {
    /// The authorized sender, 20 bytes of hex.
    pub sender: String,
    /// The call target, 20 bytes of hex, or empty for contract creation.
    pub to: String,
    /// The sender's nonce.
    pub nonce: u64,
    /// The call data as hex.
    pub data: String,
    /// The verifier-assigned transaction identity, 32 bytes of hex.
    pub tx_hash: String,
}

/// The response of `get_latest_block`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LatestBlock {
    /// The canonical tip's identity.
    pub veda_block_hash: String,
    /// The canonical tip's number.
    pub veda_block_number: u64,
    /// The canonical tip's timestamp.
    pub veda_timestamp: u64,
}

//
// Read surface
//

/// A call/estimate request object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcCallRequest {
    /// The caller address.
    pub from: Option<String>,
    /// The call target; absent for creation.
    pub to: Option<String>,
    /// The call data.
    pub data: Option<String>,
    /// Alias of `data` used by some clients.
    pub input: Option<String>,
    /// The gas budget.
    pub gas: Option<String>,
    /// Accepted and ignored; gas is free.
    pub gas_price: Option<String>,
    /// Accepted and ignored; value transfers are disabled.
    pub value: Option<String>,
}

/// `eth_getLogs` filter parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterParams {
    /// The first block of the range, as a hex number or tag.
    pub from_block: Option<String>,
    /// The last block of the range, as a hex number or tag.
    pub to_block: Option<String>,
    /// A single address or a list of addresses to match.
    pub address: Option<AddressFilter>,
    /// Positional topic filters; `null` entries match anything.
    pub topics: Option<Vec<Option<String>>>,
    /// Restricts the filter to one block.
    pub block_hash: Option<String>,
}

/// The address field of a log filter.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressFilter {
    /// A single address.
    Single(String),
    /// Any of several addresses.
    Many(Vec<String>),
}

impl AddressFilter {
    /// The addresses this filter matches.
    pub fn addresses(&self) -> Vec<Option<Address>> {
        match self {
            Self::Single(addr) => vec![parse_address(addr)],
            Self::Many(addrs) => addrs.iter().map(|addr| parse_address(addr)).collect(),
        }
    }
}

/// A block as shaped for the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    /// Constant difficulty.
    pub difficulty: String,
    /// The header's extra data.
    pub extra_data: String,
    /// The block gas limit.
    pub gas_limit: String,
    /// The gas used by the block.
    pub gas_used: String,
    /// The sequencer-assigned identity.
    pub hash: String,
    /// The header bloom.
    pub logs_bloom: String,
    /// Always the zero address.
    pub miner: String,
    /// The sequencer-supplied mix hash.
    pub mix_hash: String,
    /// Always the zero nonce.
    pub nonce: String,
    /// The block number.
    pub number: String,
    /// The parent identity.
    pub parent_hash: String,
    /// The receipt trie root.
    pub receipts_root: String,
    /// Always the zero hash; there are no uncles.
    pub sha3_uncles: String,
    /// The world-state root.
    pub state_root: String,
    /// The block timestamp.
    pub timestamp: String,
    /// The transaction trie root.
    pub transactions_root: String,
    /// Always zero; there is no fee market.
    pub base_fee_per_gas: String,
    /// Always zero; difficulty is not accumulated.
    pub total_difficulty: String,
    /// Always empty.
    pub uncles: Vec<String>,
    /// The RLP-encoded block length.
    pub size: String,
    /// Transaction hashes, or full objects when requested.
    pub transactions: Vec<serde_json::Value>,
}

/// A transaction as shaped for the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    /// The verifier-assigned identity.
    pub hash: String,
    /// The declared nonce.
    pub nonce: String,
    /// The enclosing block's identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    /// The enclosing block's number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    /// The position within the enclosing block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_index: Option<String>,
    /// The authorized sender.
    pub from: String,
    /// The call target, or `null` for creation.
    pub to: Option<String>,
    /// The call data.
    pub input: String,
    /// Always zero; value transfers are disabled.
    pub value: String,
    /// The gas limit.
    pub gas: String,
    /// Always zero; gas is free.
    pub gas_price: String,
    /// Always zero, kept for explorer compatibility.
    pub gas_used: String,
    /// Always zero, kept for explorer compatibility.
    pub r: String,
    /// Always zero, kept for explorer compatibility.
    pub s: String,
    /// Always zero, kept for explorer compatibility.
    pub v: String,
}

/// A log as shaped for the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    /// The emitting address.
    pub address: String,
    /// The enclosing block's identity.
    pub block_hash: String,
    /// The enclosing block's number.
    pub block_number: String,
    /// The unindexed payload.
    pub data: String,
    /// The log's index within the block.
    pub log_index: String,
    /// Always `false`; only canonical logs are served.
    pub removed: bool,
    /// The indexed topics.
    pub topics: Vec<String>,
    /// The emitting transaction's identity.
    pub transaction_hash: String,
    /// The emitting transaction's position.
    pub transaction_index: String,
}

/// A receipt as shaped for the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    /// The enclosing block's identity.
    pub block_hash: String,
    /// The enclosing block's number.
    pub block_number: String,
    /// The created contract's address, for creation transactions.
    pub contract_address: Option<String>,
    /// The gas used by this and all prior transactions in the block.
    pub cumulative_gas_used: String,
    /// The authorized sender.
    pub from: String,
    /// The gas used by this transaction alone.
    pub gas_used: String,
    /// The logs emitted by the transaction.
    pub logs: Vec<RpcLog>,
    /// The receipt's bloom filter.
    pub logs_bloom: String,
    /// `0x01` on success, `0x00` on failure.
    pub status: String,
    /// The call target, or `0x` for creation.
    pub to: String,
    /// The transaction's identity.
    pub transaction_hash: String,
    /// The transaction's position.
    pub transaction_index: String,
    /// Equal to the reported gas price; gas is free.
    pub effective_gas_price: String,
}

//
// Formatters
//

/// Shapes a transaction, optionally anchored to its canonical location.
pub fn transaction_to_rpc(
    tx: &Transaction,
    location: Option<(&SealedHeader, u64)>,
) -> RpcTransaction {
    RpcTransaction {
        hash: hex_bytes(tx.hash().as_slice()),
        nonce: hex_u64(tx.nonce),
        block_hash: location.map(|(header, _)| hex_bytes(header.hash().as_slice())),
        block_number: location.map(|(header, _)| hex_u64(header.block_number)),
        transaction_index: location.map(|(_, index)| hex_u64(index)),
        from: hex_bytes(tx.veda_sender.as_slice()),
        to: tx.to.map(|to| hex_bytes(to.as_slice())),
        input: hex_bytes(&tx.data),
        value: "0x0".to_string(),
        gas: hex_u64(tx.gas),
        gas_price: "0x0".to_string(),
        gas_used: "0x0".to_string(),
        r: "0x0".to_string(),
        s: "0x0".to_string(),
        v: "0x0".to_string(),
    }
}

/// Shapes a log entry anchored to its block and transaction.
pub fn log_to_rpc(
    log: &Log,
    header: &SealedHeader,
    tx_hash: B256,
    tx_index: u64,
    log_index: u64,
) -> RpcLog {
    RpcLog {
        address: hex_bytes(log.address.as_slice()),
        block_hash: hex_bytes(header.hash().as_slice()),
        block_number: hex_u64(header.block_number),
        data: hex_bytes(&log.data),
        log_index: hex_u64(log_index),
        removed: false,
        topics: log.topics.iter().map(|topic| hex_bytes(topic.as_slice())).collect(),
        transaction_hash: hex_bytes(tx_hash.as_slice()),
        transaction_index: hex_u64(tx_index),
    }
}

/// Shapes a receipt. `prior_cumulative` is the cumulative gas of the preceding receipt,
/// used to recover this transaction's own gas.
pub fn receipt_to_rpc(
    receipt: &Receipt,
    tx: &Transaction,
    index: u64,
    header: &SealedHeader,
    prior_cumulative: u64,
) -> RpcReceipt {
    let contract_address = tx
        .is_create()
        .then(|| hex_bytes(generate_contract_address(tx.veda_sender, tx.nonce).as_slice()));
    let tx_gas_used = receipt.cumulative_gas_used.saturating_sub(prior_cumulative);

    RpcReceipt {
        block_hash: hex_bytes(header.hash().as_slice()),
        block_number: hex_u64(header.block_number),
        contract_address,
        cumulative_gas_used: hex_u64(receipt.cumulative_gas_used),
        from: hex_bytes(tx.veda_sender.as_slice()),
        gas_used: hex_u64(tx_gas_used),
        logs: receipt
            .logs
            .iter()
            .enumerate()
            .map(|(log_index, log)| {
                log_to_rpc(log, header, tx.hash(), index, log_index as u64)
            })
            .collect(),
        logs_bloom: hex_bloom(&receipt.bloom),
        status: if receipt.success { "0x01".to_string() } else { "0x00".to_string() },
        to: tx.to.map_or_else(|| "0x".to_string(), |to| hex_bytes(to.as_slice())),
        transaction_hash: hex_bytes(tx.hash().as_slice()),
        transaction_index: hex_u64(index),
        effective_gas_price: "0x0".to_string(),
    }
}

/// Shapes a block, inlining full transaction objects when `full` is set.
pub fn block_to_rpc(header: &SealedHeader, transactions: &[Transaction], full: bool) -> RpcBlock {
    let txs: Vec<serde_json::Value> = if full {
        transactions
            .iter()
            .enumerate()
            .map(|(index, tx)| {
                serde_json::to_value(transaction_to_rpc(tx, Some((header, index as u64))))
                    .unwrap_or(serde_json::Value::Null)
            })
            .collect()
    } else {
        transactions
            .iter()
            .map(|tx| serde_json::Value::String(hex_bytes(tx.hash().as_slice())))
            .collect()
    };

    let block = Block {
        header: header.header().clone(),
        transactions: transactions.to_vec(),
    };
    let size = alloy_rlp::encode(&block).len();

    RpcBlock {
        difficulty: hex_u64(header.difficulty),
        extra_data: hex_bytes(&header.extra_data),
        gas_limit: hex_u64(header.gas_limit),
        gas_used: hex_u64(header.gas_used),
        hash: hex_bytes(header.hash().as_slice()),
        logs_bloom: hex_bloom(&header.bloom),
        miner: hex_bytes(Address::ZERO.as_slice()),
        mix_hash: hex_bytes(header.mix_hash.as_slice()),
        nonce: "0x0000000000000000".to_string(),
        number: hex_u64(header.block_number),
        parent_hash: hex_bytes(header.parent_hash.as_slice()),
        receipts_root: hex_bytes(header.receipt_root.as_slice()),
        sha3_uncles: hex_bytes(B256::ZERO.as_slice()),
        state_root: hex_bytes(header.state_root.as_slice()),
        timestamp: hex_u64(header.timestamp),
        transactions_root: hex_bytes(header.transaction_root.as_slice()),
        base_fee_per_gas: "0x0".to_string(),
        total_difficulty: "0x0".to_string(),
        uncles: Vec::new(),
        size: hex_u64(size as u64),
        transactions: txs,
    }
}

/// Resolves the call data of a request, honoring the `input` alias.
pub fn call_request_data(request: &RpcCallRequest) -> Option<Bytes> {
    let raw = request.data.as_deref().or(request.input.as_deref()).unwrap_or("0x");
    parse_hex_bytes(raw).map(Bytes::from)
}
