//! Transaction receipts and logs.

use alloy_primitives::{Address, Bloom, BloomInput, Bytes, B256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header as RlpHeader, RlpDecodable, RlpEncodable};

/// A log emitted during execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Log {
    /// The address that emitted the log.
    pub address: Address,
    /// The indexed topics, each a 256-bit word.
    pub topics: Vec<B256>,
    /// The unindexed payload.
    pub data: Bytes,
}

/// The receipt of a single transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    /// `true` when the transaction's computation completed without error.
    pub success: bool,
    /// The gas used by this and all prior transactions in the block.
    pub cumulative_gas_used: u64,
    /// The bloom filter over the logs' addresses and topics.
    pub bloom: Bloom,
    /// The logs emitted by the transaction.
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Builds a receipt, deriving the bloom from the logs.
    pub fn new(success: bool, cumulative_gas_used: u64, logs: Vec<Log>) -> Self {
        let bloom = logs_bloom(&logs);
        Self { success, cumulative_gas_used, bloom, logs }
    }

    fn payload_length(&self) -> usize {
        // The status byte encodes as a one-byte string.
        1 + self.cumulative_gas_used.length() + self.bloom.length() + self.logs.length()
    }
}

impl Encodable for Receipt {
    fn encode(&self, out: &mut dyn BufMut) {
        RlpHeader { list: true, payload_length: self.payload_length() }.encode(out);
        let status: &[u8] = if self.success { &[0x01] } else { &[0x00] };
        status.encode(out);
        self.cumulative_gas_used.encode(out);
        self.bloom.encode(out);
        self.logs.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

impl Decodable for Receipt {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = RlpHeader::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }

        let status = Bytes::decode(buf)?;
        let success = match status.as_ref() {
            [0x01] => true,
            [0x00] => false,
            _ => return Err(alloy_rlp::Error::Custom("invalid receipt status byte")),
        };
        let cumulative_gas_used = u64::decode(buf)?;
        let bloom = Bloom::decode(buf)?;
        let logs = Vec::<Log>::decode(buf)?;

        Ok(Self { success, cumulative_gas_used, bloom, logs })
    }
}

/// Computes the bloom filter over the given logs.
///
/// For each log address and each 32-byte topic, the three 11-bit indices derived from the
/// first six bytes of the keccak of the input are set.
pub fn logs_bloom<'a>(logs: impl IntoIterator<Item = &'a Log>) -> Bloom {
    let mut bloom = Bloom::default();
    for log in logs {
        bloom.accrue(BloomInput::Raw(log.address.as_slice()));
        for topic in &log.topics {
            bloom.accrue(BloomInput::Raw(topic.as_slice()));
        }
    }
    bloom
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> Log {
        Log {
            address: Address::repeat_byte(0xaa),
            topics: vec![B256::repeat_byte(0x01), B256::repeat_byte(0x02)],
            data: Bytes::from_static(&[0xde, 0xad]),
        }
    }

    #[test]
    fn test_receipt_roundtrip() {
        let receipt = Receipt::new(true, 21_006, vec![sample_log()]);
        let encoded = alloy_rlp::encode(&receipt);
        let decoded = Receipt::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, receipt);
        assert_eq!(alloy_rlp::encode(&decoded), encoded);
    }

    #[test]
    fn test_failure_status_roundtrip() {
        let receipt = Receipt::new(false, 1_000_000, vec![]);
        let encoded = alloy_rlp::encode(&receipt);
        assert!(!Receipt::decode(&mut encoded.as_slice()).unwrap().success);
    }

    #[test]
    fn test_bloom_contains_address_and_topics() {
        let log = sample_log();
        let bloom = logs_bloom([&log]);

        assert!(bloom.contains_input(BloomInput::Raw(log.address.as_slice())));
        for topic in &log.topics {
            assert!(bloom.contains_input(BloomInput::Raw(topic.as_slice())));
        }
        assert!(!bloom.contains_input(BloomInput::Raw(Address::repeat_byte(0xbb).as_slice())));
    }

    #[test]
    fn test_empty_logs_empty_bloom() {
        assert_eq!(logs_bloom([]), Bloom::default());
    }
}
