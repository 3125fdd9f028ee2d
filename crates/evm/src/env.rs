//! Block and transaction environments visible to executing code.

use alloy_primitives::{Address, B256, U256};
use veda_primitives::constants::{BLOCK_GAS_LIMIT, VEDA_CHAIN_ID};

/// The block-level environment: what the environmental opcodes observe.
#[derive(Debug, Clone)]
pub struct BlockEnv {
    /// The number of the block being built.
    pub number: u64,
    /// The timestamp of the block being built.
    pub timestamp: u64,
    /// The block gas limit.
    pub gas_limit: u64,
    /// The coinbase address. Always zero; no fees are paid.
    pub coinbase: Address,
    /// The sequencer-supplied mix hash, exposed by the PREVRANDAO opcode.
    pub mix_hash: B256,
    /// The chain id exposed by the CHAINID opcode.
    pub chain_id: u64,
    /// The identities of up to 256 ancestor blocks, most recent first, for BLOCKHASH.
    pub block_hashes: Vec<B256>,
}

impl Default for BlockEnv {
    fn default() -> Self {
        Self {
            number: 0,
            timestamp: 0,
            gas_limit: BLOCK_GAS_LIMIT,
            coinbase: Address::ZERO,
            mix_hash: B256::ZERO,
            chain_id: VEDA_CHAIN_ID,
            block_hashes: Vec::new(),
        }
    }
}

impl BlockEnv {
    /// The hash of the ancestor at `number`, or zero when out of the 256-block window.
    pub fn ancestor_hash(&self, number: U256) -> B256 {
        let Ok(number) = u64::try_from(number) else {
            return B256::ZERO;
        };
        if number >= self.number {
            return B256::ZERO;
        }
        let depth = (self.number - 1 - number) as usize;
        if depth >= 256 {
            return B256::ZERO;
        }
        self.block_hashes.get(depth).copied().unwrap_or(B256::ZERO)
    }
}

/// The transaction-level context. Gas price is zero by construction: balances are never
/// debited for gas.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionContext {
    /// The externally-owned account the transaction originates from.
    pub origin: Address,
    /// The effective gas price, exposed by the GASPRICE opcode.
    pub gas_price: U256,
}

impl TransactionContext {
    /// Creates a context originating at `origin` with a zero gas price.
    pub fn new(origin: Address) -> Self {
        Self { origin, gas_price: U256::ZERO }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestor_hash_window() {
        let env = BlockEnv {
            number: 10,
            block_hashes: (0..5).map(|i| B256::repeat_byte(i as u8 + 1)).collect(),
            ..Default::default()
        };

        // Parent (number 9) is the first entry.
        assert_eq!(env.ancestor_hash(U256::from(9)), B256::repeat_byte(0x01));
        assert_eq!(env.ancestor_hash(U256::from(7)), B256::repeat_byte(0x03));
        // The current block and the future are zero.
        assert_eq!(env.ancestor_hash(U256::from(10)), B256::ZERO);
        assert_eq!(env.ancestor_hash(U256::from(11)), B256::ZERO);
        // Beyond the retained window is zero.
        assert_eq!(env.ancestor_hash(U256::from(1)), B256::ZERO);
    }
}
