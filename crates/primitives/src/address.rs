//! Contract address derivation.

use alloy_primitives::{keccak256, Address, B256};
use alloy_rlp::Encodable;

/// Derives the address of a contract created by `sender` at `nonce`:
/// `keccak(rlp([sender, nonce]))[12..]`.
pub fn generate_contract_address(sender: Address, nonce: u64) -> Address {
    let mut payload = Vec::with_capacity(32);
    sender.encode(&mut payload);
    nonce.encode(&mut payload);

    let mut out = Vec::with_capacity(payload.len() + 1);
    alloy_rlp::Header { list: true, payload_length: payload.len() }.encode(&mut out);
    out.extend(payload);

    Address::from_slice(&keccak256(&out)[12..])
}

/// Derives the CREATE2 address for `sender`, `salt`, and `initcode`:
/// `keccak(0xff ++ sender ++ salt ++ keccak(initcode))[12..]`.
pub fn generate_safe_contract_address(sender: Address, salt: B256, initcode: &[u8]) -> Address {
    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(0xff);
    preimage.extend_from_slice(sender.as_slice());
    preimage.extend_from_slice(salt.as_slice());
    preimage.extend_from_slice(keccak256(initcode).as_slice());

    Address::from_slice(&keccak256(&preimage)[12..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_create_address_known_vector() {
        let sender = address!("6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0");
        assert_eq!(
            generate_contract_address(sender, 0),
            address!("cd234a471b72ba2f1ccf0a70fcaba648a5eecd8d")
        );
        assert_eq!(
            generate_contract_address(sender, 1),
            address!("343c43a37d37dff08ae8c4a11544c718abb4fcf8")
        );
    }

    #[test]
    fn test_create2_address_known_vector() {
        // EIP-1014 example 1: address 0x0, salt 0x0, initcode 0x00.
        assert_eq!(
            generate_safe_contract_address(Address::ZERO, B256::ZERO, &[0x00]),
            address!("4d1a2e2bb4f88f0250f26ffff098b0b30b26bf38")
        );
    }
}
