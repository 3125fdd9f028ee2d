#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub use alloy_primitives::{Address, Bloom, BloomInput, Bytes, B256, U256};
pub use alloy_trie::EMPTY_ROOT_HASH;

pub mod constants;

mod header;
pub use header::{Header, SealedHeader};

mod transaction;
pub use transaction::Transaction;

mod receipt;
pub use receipt::{logs_bloom, Log, Receipt};

mod block;
pub use block::{Block, SealedBlock};

mod address;
pub use address::{generate_contract_address, generate_safe_contract_address};
