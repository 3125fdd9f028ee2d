//! Block validation against the canonical tip.

use crate::{
    chaindb::ChainDb,
    errors::{ExecutorResult, ValidationError},
};
use alloy_primitives::BloomInput;
use veda_primitives::{constants::MAX_EXTRA_DATA_BYTES, Receipt, SealedBlock, SealedHeader};
use veda_trie::ordered_trie_root;

/// Validates a sealed block before persistence.
///
/// There is no proof-of-work or proof-of-stake check, no gas-limit delta bound, and no
/// uncle validation: ordering authority rests entirely with the verifier.
pub fn validate_block(
    db: &ChainDb,
    parent: &SealedHeader,
    block: &SealedBlock,
    receipts: &[Receipt],
    computed_state_root: alloy_primitives::B256,
) -> ExecutorResult<()> {
    let header = &block.header;

    if header.parent_hash != parent.hash() {
        return Err(ValidationError::ParentMismatch {
            number: header.block_number,
            expected: parent.hash(),
            got: header.parent_hash,
        }
        .into());
    }

    if header.block_number != parent.block_number + 1 {
        return Err(ValidationError::BlockNumber {
            expected: parent.block_number + 1,
            got: header.block_number,
        }
        .into());
    }

    if header.timestamp <= parent.timestamp {
        return Err(ValidationError::Timestamp {
            timestamp: header.timestamp,
            parent_timestamp: parent.timestamp,
        }
        .into());
    }

    if header.extra_data.len() > MAX_EXTRA_DATA_BYTES {
        return Err(ValidationError::ExtraDataTooLong(header.extra_data.len()).into());
    }

    let computed_tx_root = ordered_trie_root(&block.transactions)?;
    if header.transaction_root != computed_tx_root {
        return Err(ValidationError::TransactionRoot {
            header: header.transaction_root,
            computed: computed_tx_root,
        }
        .into());
    }

    if header.state_root != computed_state_root && !db.has_state_root(header.state_root)? {
        return Err(ValidationError::StateRoot(header.state_root).into());
    }

    for receipt in receipts {
        for log in &receipt.logs {
            if !header.bloom.contains_input(BloomInput::Raw(log.address.as_slice())) {
                return Err(ValidationError::BloomMismatch.into());
            }
            for topic in &log.topics {
                if !header.bloom.contains_input(BloomInput::Raw(topic.as_slice())) {
                    return Err(ValidationError::BloomMismatch.into());
                }
            }
        }
    }

    Ok(())
}
