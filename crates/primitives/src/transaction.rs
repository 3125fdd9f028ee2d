//! The sequencer-authorized transaction type.

use crate::constants::{GAS_TX, GAS_TXCREATE, GAS_TXDATANONZERO, GAS_TXDATAZERO};
use alloy_primitives::{Address, Bytes, B256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header as RlpHeader};

/// A transaction as authorized by the verifier.
///
/// There are no signature fields: the verifier has already authenticated the sender and
/// declares it in `veda_sender`, along with the transaction's identity in `veda_txhash`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// The sender's account nonce at the time of application.
    pub nonce: u64,
    /// The gas limit granted to the transaction.
    pub gas: u64,
    /// The call target, or `None` for contract creation.
    pub to: Option<Address>,
    /// Call data, or initcode when creating a contract.
    pub data: Bytes,
    /// The sender address, as declared by the verifier.
    pub veda_sender: Address,
    /// The transaction's identity, as declared by the verifier.
    pub veda_txhash: B256,
}

impl Transaction {
    /// The transaction's identity: its verifier-assigned hash.
    pub const fn hash(&self) -> B256 {
        self.veda_txhash
    }

    /// Returns `true` if the transaction creates a contract.
    pub const fn is_create(&self) -> bool {
        self.to.is_none()
    }

    /// The fixed cost of the transaction before any bytecode executes.
    pub fn intrinsic_gas(&self) -> u64 {
        let zero_bytes = self.data.iter().filter(|&&byte| byte == 0).count() as u64;
        let nonzero_bytes = self.data.len() as u64 - zero_bytes;
        let create_cost = if self.is_create() { GAS_TXCREATE } else { 0 };
        GAS_TX + zero_bytes * GAS_TXDATAZERO + nonzero_bytes * GAS_TXDATANONZERO + create_cost
    }

    fn payload_length(&self) -> usize {
        self.nonce.length() +
            self.gas.length() +
            self.to.map_or(1, |to| to.length()) +
            self.data.length() +
            self.veda_sender.length() +
            self.veda_txhash.length()
    }
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut dyn BufMut) {
        RlpHeader { list: true, payload_length: self.payload_length() }.encode(out);
        self.nonce.encode(out);
        self.gas.encode(out);
        match self.to {
            Some(to) => to.encode(out),
            // Contract creation carries an empty `to` field.
            None => out.put_u8(alloy_rlp::EMPTY_STRING_CODE),
        }
        self.data.encode(out);
        self.veda_sender.encode(out);
        self.veda_txhash.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

impl Decodable for Transaction {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = RlpHeader::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }

        let nonce = u64::decode(buf)?;
        let gas = u64::decode(buf)?;
        let to_bytes = Bytes::decode(buf)?;
        let to = match to_bytes.len() {
            0 => None,
            20 => Some(Address::from_slice(&to_bytes)),
            _ => return Err(alloy_rlp::Error::UnexpectedLength),
        };
        let data = Bytes::decode(buf)?;
        let veda_sender = Address::decode(buf)?;
        let veda_txhash = B256::decode(buf)?;

        Ok(Self { nonce, gas, to, data, veda_sender, veda_txhash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn tx(to: Option<Address>, data: &'static [u8]) -> Transaction {
        Transaction {
            nonce: 1,
            gas: 1_000_000,
            to,
            data: Bytes::from_static(data),
            veda_sender: address!("50b8f981ce93fd5b81b8444091691484284001da"),
            veda_txhash: B256::repeat_byte(0x01),
        }
    }

    #[test]
    fn test_roundtrip_call() {
        let tx = tx(Some(Address::repeat_byte(0x04)), &[0x12, 0x34]);
        let encoded = alloy_rlp::encode(&tx);
        assert_eq!(Transaction::decode(&mut encoded.as_slice()).unwrap(), tx);
    }

    #[test]
    fn test_roundtrip_create() {
        let tx = tx(None, &[0x60, 0x00, 0x60, 0x00]);
        let encoded = alloy_rlp::encode(&tx);
        let decoded = Transaction::decode(&mut encoded.as_slice()).unwrap();
        assert!(decoded.is_create());
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_intrinsic_gas() {
        // Two non-zero bytes of data.
        assert_eq!(tx(Some(Address::ZERO), &[0x12, 0x34]).intrinsic_gas(), 21_032);
        // One zero byte, one non-zero byte.
        assert_eq!(tx(Some(Address::ZERO), &[0x00, 0x34]).intrinsic_gas(), 21_020);
        // Creation adds the create surcharge.
        assert_eq!(tx(None, &[]).intrinsic_gas(), 53_000);
    }

    proptest::proptest! {
        /// Re-encoding a decoded transaction yields identical bytes.
        #[test]
        fn proptest_roundtrip(
            nonce in proptest::arbitrary::any::<u64>(),
            gas in proptest::arbitrary::any::<u64>(),
            create in proptest::arbitrary::any::<bool>(),
            to_seed in proptest::arbitrary::any::<[u8; 20]>(),
            data in proptest::collection::vec(proptest::arbitrary::any::<u8>(), 0..256),
            sender in proptest::arbitrary::any::<[u8; 20]>(),
            tx_hash in proptest::arbitrary::any::<[u8; 32]>(),
        ) {
            let tx = Transaction {
                nonce,
                gas,
                to: (!create).then(|| Address::from(to_seed)),
                data: Bytes::from(data),
                veda_sender: Address::from(sender),
                veda_txhash: B256::from(tx_hash),
            };
            let encoded = alloy_rlp::encode(&tx);
            let decoded = Transaction::decode(&mut encoded.as_slice()).unwrap();
            proptest::prop_assert_eq!(&decoded, &tx);
            proptest::prop_assert_eq!(alloy_rlp::encode(&decoded), encoded);
        }
    }

    #[test]
    fn test_rejects_malformed_to() {
        // A 19-byte `to` field is neither a creation nor a call target.
        let mut payload = Vec::new();
        1u64.encode(&mut payload);
        1_000u64.encode(&mut payload);
        Bytes::from_static(&[0x11; 19]).encode(&mut payload);
        Bytes::new().encode(&mut payload);
        Address::ZERO.encode(&mut payload);
        B256::ZERO.encode(&mut payload);

        let mut encoded = Vec::new();
        RlpHeader { list: true, payload_length: payload.len() }.encode(&mut encoded);
        encoded.extend(payload);
        assert!(Transaction::decode(&mut encoded.as_slice()).is_err());
    }
}
