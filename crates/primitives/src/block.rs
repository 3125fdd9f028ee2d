//! The block type: a header paired with its transactions.

use crate::{Header, SealedHeader, Transaction};
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// A block: a header and the transactions it commits to.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Block {
    /// The block's header.
    pub header: Header,
    /// The transactions applied by the block, in application order.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Seals the block, fixing the header's identity.
    pub fn seal(self) -> SealedBlock {
        SealedBlock { header: self.header.seal(), transactions: self.transactions }
    }
}

/// A [Block] whose header identity has been fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlock {
    /// The sealed header.
    pub header: SealedHeader,
    /// The transactions applied by the block, in application order.
    pub transactions: Vec<Transaction>,
}

impl SealedBlock {
    /// The block's identity: its sequencer-assigned hash.
    pub const fn hash(&self) -> alloy_primitives::B256 {
        self.header.hash()
    }

    /// Unseals the block.
    pub fn into_inner(self) -> Block {
        Block { header: self.header.into_inner(), transactions: self.transactions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use alloy_rlp::Decodable;

    #[test]
    fn test_block_roundtrip() {
        let block = Block {
            header: Header { veda_block_hash: B256::repeat_byte(0x42), ..Default::default() },
            transactions: vec![Transaction::default()],
        };
        let encoded = alloy_rlp::encode(&block);
        assert_eq!(Block::decode(&mut encoded.as_slice()).unwrap(), block);
    }

    #[test]
    fn test_sealed_block_identity() {
        let block = Block {
            header: Header { veda_block_hash: B256::repeat_byte(0x42), ..Default::default() },
            transactions: vec![],
        };
        assert_eq!(block.seal().hash(), B256::repeat_byte(0x42));
    }
}
