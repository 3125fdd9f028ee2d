//! Protocol constants shared across the execution layer.

use alloy_primitives::{b256, B256};

/// Keccak-256 of the empty byte string, the code hash of an account with no code.
pub const KECCAK_EMPTY: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

/// The gas limit carried by every block header and granted to every sync-supplied transaction.
pub const BLOCK_GAS_LIMIT: u64 = 10_485_760;

/// The timestamp of the genesis header.
pub const GENESIS_TIMESTAMP: u64 = 1_700_984_871;

/// The difficulty recorded in every header. The sequencer decides ordering, so difficulty is a
/// constant carried for codec compatibility.
pub const HEADER_DIFFICULTY: u64 = 0;

/// The difficulty recorded in the genesis header.
pub const GENESIS_DIFFICULTY: u64 = 1;

/// The maximum length of a header's `extra_data` field in bytes.
pub const MAX_EXTRA_DATA_BYTES: usize = 32;

/// Base cost of a transaction.
pub const GAS_TX: u64 = 21_000;

/// Per-byte cost of zero bytes in transaction data.
pub const GAS_TXDATAZERO: u64 = 4;

/// Per-byte cost of non-zero bytes in transaction data.
pub const GAS_TXDATANONZERO: u64 = 16;

/// Additional cost of a contract-creating transaction.
pub const GAS_TXCREATE: u64 = 32_000;

/// Per-byte cost of storing contract code at the end of a successful creation.
pub const GAS_CODEDEPOSIT: u64 = 200;

/// EIP-2929: cost of reading a warm storage slot or touching a warm account.
pub const WARM_STORAGE_READ_COST: u64 = 100;

/// EIP-2929: cost of the first read of a storage slot within a transaction.
pub const COLD_SLOAD_COST: u64 = 2_100;

/// EIP-2929: cost of the first access to an account within a transaction.
pub const COLD_ACCOUNT_ACCESS_COST: u64 = 2_600;

/// EIP-3860: per-32-byte-word cost of initcode.
pub const INITCODE_WORD_COST: u64 = 2;

/// EIP-3860: maximum initcode length.
pub const MAX_INITCODE_SIZE: usize = 24_576 * 2;

/// EIP-170: maximum deployed code length.
pub const EIP170_CODE_SIZE_LIMIT: usize = 24_576;

/// Base cost of the SELFDESTRUCT opcode.
pub const GAS_SELFDESTRUCT: u64 = 5_000;

/// Refund granted per account scheduled for self-destruction.
pub const REFUND_SELFDESTRUCT: u64 = 24_000;

/// The divisor capping the refund applied to a transaction: refunds never exceed
/// `gas_used / MAX_REFUND_QUOTIENT`.
pub const MAX_REFUND_QUOTIENT: u64 = 2;

/// The maximum depth of the message-call stack.
pub const STACK_DEPTH_LIMIT: usize = 1_024;

/// The default chain id reported by the read RPC.
pub const VEDA_CHAIN_ID: u64 = 1;
