//! This module contains the [TrieAccount] struct.

use alloy_primitives::{B256, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use alloy_trie::EMPTY_ROOT_HASH;
use veda_primitives::constants::KECCAK_EMPTY;

/// An account as represented in the world-state trie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct TrieAccount {
    /// Account nonce.
    pub nonce: u64,
    /// Account balance. Always zero in production use; kept for codec compatibility.
    pub balance: U256,
    /// Root of the account's storage trie.
    pub storage_root: B256,
    /// Hash of the account's bytecode.
    pub code_hash: B256,
}

impl Default for TrieAccount {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::ZERO,
            storage_root: EMPTY_ROOT_HASH,
            code_hash: KECCAK_EMPTY,
        }
    }
}

impl TrieAccount {
    /// Returns `true` if the account is empty per EIP-161: zero nonce, zero balance, no code.
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.code_hash == KECCAK_EMPTY
    }

    /// Returns `true` if the account has code or a non-zero nonce. Used for contract-creation
    /// collision detection.
    pub fn has_code_or_nonce(&self) -> bool {
        self.nonce != 0 || self.code_hash != KECCAK_EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::Decodable;

    #[test]
    fn test_default_account_is_empty() {
        let account = TrieAccount::default();
        assert!(account.is_empty());
        assert!(!account.has_code_or_nonce());
    }

    #[test]
    fn test_account_roundtrip() {
        let account = TrieAccount {
            nonce: 3,
            balance: U256::ZERO,
            storage_root: B256::repeat_byte(0x01),
            code_hash: B256::repeat_byte(0x02),
        };
        let encoded = alloy_rlp::encode(account);
        assert_eq!(TrieAccount::decode(&mut encoded.as_slice()).unwrap(), account);
    }

    #[test]
    fn test_nonce_or_code_flags() {
        let with_nonce = TrieAccount { nonce: 1, ..Default::default() };
        assert!(with_nonce.has_code_or_nonce());
        assert!(!with_nonce.is_empty());

        let with_code = TrieAccount { code_hash: B256::repeat_byte(0xcc), ..Default::default() };
        assert!(with_code.has_code_or_nonce());
    }
}
