//! The block header type and its sealed-identity wrapper.

use crate::constants::{
    BLOCK_GAS_LIMIT, GENESIS_DIFFICULTY, GENESIS_TIMESTAMP, HEADER_DIFFICULTY,
};
use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use alloy_trie::EMPTY_ROOT_HASH;

/// A Veda block header.
///
/// The layout follows the classic Ethereum header with the uncle hash and nonce dropped and
/// three sequencer-assigned fields appended: `veda_block_hash`, `veda_block_number`, and
/// `veda_timestamp`. The header's identity is `veda_block_hash`; see [SealedHeader].
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Header {
    /// The identity of the parent block.
    pub parent_hash: B256,
    /// The beneficiary address. Always zero; no fees are paid.
    pub coinbase: Address,
    /// The world-state trie root after applying this block.
    pub state_root: B256,
    /// The root of the trie mapping `rlp(index)` to `rlp(transaction)`.
    pub transaction_root: B256,
    /// The root of the trie mapping `rlp(index)` to `rlp(receipt)`.
    pub receipt_root: B256,
    /// The union of every receipt's logs bloom.
    pub bloom: Bloom,
    /// Constant difficulty, carried for codec compatibility.
    pub difficulty: u64,
    /// The block number. Increases by exactly one from the parent.
    pub block_number: u64,
    /// The block gas limit.
    pub gas_limit: u64,
    /// The total gas used by the block's transactions.
    pub gas_used: u64,
    /// The block timestamp. Strictly greater than the parent's.
    pub timestamp: u64,
    /// Arbitrary extra data, at most 32 bytes.
    pub extra_data: Bytes,
    /// The sequencer-supplied mix hash.
    pub mix_hash: B256,
    /// The sequencer-assigned block identity.
    pub veda_block_hash: B256,
    /// The sequencer-assigned block number.
    pub veda_block_number: u64,
    /// The sequencer-assigned timestamp.
    pub veda_timestamp: u64,
}

impl Header {
    /// The genesis header: empty state, empty transaction and receipt tries, zero parent.
    ///
    /// The sequencer never assigns an identity to genesis, so its `veda_block_hash` is derived
    /// once from the keccak of its own encoding with the identity field zeroed.
    pub fn genesis() -> Self {
        let mut header = Self {
            parent_hash: B256::ZERO,
            coinbase: Address::ZERO,
            state_root: EMPTY_ROOT_HASH,
            transaction_root: EMPTY_ROOT_HASH,
            receipt_root: EMPTY_ROOT_HASH,
            bloom: Bloom::default(),
            difficulty: GENESIS_DIFFICULTY,
            block_number: 0,
            gas_limit: BLOCK_GAS_LIMIT,
            gas_used: 0,
            timestamp: GENESIS_TIMESTAMP,
            extra_data: Bytes::new(),
            mix_hash: B256::ZERO,
            veda_block_hash: B256::ZERO,
            veda_block_number: 0,
            veda_timestamp: GENESIS_TIMESTAMP,
        };
        header.veda_block_hash = keccak256(alloy_rlp::encode(&header));
        header
    }

    /// Builds the pending header for the block following `parent`.
    ///
    /// The sequencer-assigned fields and the final roots are filled in when the block is
    /// sealed; until then the pending header carries the parent's state root and a
    /// placeholder timestamp.
    pub fn pending_from_parent(parent: &SealedHeader) -> Self {
        Self {
            parent_hash: parent.hash(),
            coinbase: Address::ZERO,
            state_root: parent.state_root,
            transaction_root: EMPTY_ROOT_HASH,
            receipt_root: EMPTY_ROOT_HASH,
            bloom: Bloom::default(),
            difficulty: HEADER_DIFFICULTY,
            block_number: parent.block_number + 1,
            gas_limit: parent.gas_limit,
            gas_used: 0,
            timestamp: parent.timestamp + 1,
            extra_data: Bytes::new(),
            mix_hash: B256::ZERO,
            veda_block_hash: B256::ZERO,
            veda_block_number: parent.block_number + 1,
            veda_timestamp: parent.timestamp + 1,
        }
    }

    /// Seals the header, fixing its identity.
    pub fn seal(self) -> SealedHeader {
        SealedHeader::new(self)
    }
}

/// A [Header] with its identity fixed.
///
/// Block identity is dictated by the external sequencer: the hash of a header **is** its
/// `veda_block_hash`, never the keccak of its RLP encoding. Every storage key, canonical
/// lookup, and receipt/trace path goes through this wrapper so that no code path can
/// accidentally re-derive identity by hashing the encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedHeader {
    header: Header,
    hash: B256,
}

impl SealedHeader {
    /// Seals the given header.
    pub const fn new(header: Header) -> Self {
        let hash = header.veda_block_hash;
        Self { header, hash }
    }

    /// The header's identity: its sequencer-assigned `veda_block_hash`.
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// Returns a reference to the inner header.
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Unseals the header.
    pub fn into_inner(self) -> Header {
        self.header
    }
}

impl core::ops::Deref for SealedHeader {
    type Target = Header;

    fn deref(&self) -> &Self::Target {
        &self.header
    }
}

impl From<Header> for SealedHeader {
    fn from(header: Header) -> Self {
        Self::new(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;
    use alloy_rlp::Decodable;

    #[test]
    fn test_header_roundtrip() {
        let header = Header {
            parent_hash: B256::repeat_byte(0x11),
            state_root: B256::repeat_byte(0x22),
            bloom: Bloom::repeat_byte(0x0f),
            block_number: 7,
            gas_limit: BLOCK_GAS_LIMIT,
            gas_used: 21_000,
            timestamp: 1_700_984_999,
            extra_data: Bytes::from_static(b"veda"),
            mix_hash: B256::repeat_byte(0x6f),
            veda_block_hash: B256::repeat_byte(0xab),
            veda_block_number: 7,
            veda_timestamp: 1_700_984_999,
            ..Default::default()
        };

        let encoded = alloy_rlp::encode(&header);
        let decoded = Header::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(alloy_rlp::encode(&decoded), encoded);
    }

    #[test]
    fn test_identity_is_sequencer_assigned() {
        let hash = b256!("00000000000000000000000000000000000000000000000000000000deadbeef");
        let header = Header { veda_block_hash: hash, ..Default::default() };
        let sealed = header.seal();

        assert_eq!(sealed.hash(), hash);
        // The identity never comes from the encoding.
        assert_ne!(sealed.hash(), keccak256(alloy_rlp::encode(sealed.header())));
    }

    #[test]
    fn test_genesis_identity_stable() {
        let genesis = Header::genesis();
        assert_eq!(genesis.block_number, 0);
        assert_eq!(genesis.state_root, EMPTY_ROOT_HASH);
        assert_ne!(genesis.veda_block_hash, B256::ZERO);
        assert_eq!(genesis, Header::genesis());
    }

    #[test]
    fn test_pending_links_to_parent_identity() {
        let parent = Header {
            veda_block_hash: B256::repeat_byte(0x99),
            block_number: 3,
            timestamp: 100,
            ..Default::default()
        }
        .seal();
        let pending = Header::pending_from_parent(&parent);

        assert_eq!(pending.parent_hash, B256::repeat_byte(0x99));
        assert_eq!(pending.block_number, 4);
        assert!(pending.timestamp > parent.timestamp);
    }
}
