//! This module contains the [TrieNode] type and its RLP codec.

use crate::errors::{TrieError, TrieResult};
use alloy_primitives::{keccak256, B256};
use alloy_rlp::{length_of_length, BufMut, Decodable, Encodable, Header, EMPTY_STRING_CODE};
use alloy_trie::Nibbles;

/// The length of the branch node's RLP list.
const BRANCH_LIST_LENGTH: usize = 17;

/// The length of a leaf or extension node's RLP list.
const LEAF_OR_EXTENSION_LIST_LENGTH: usize = 2;

/// Prefix for even-nibbled extension node paths.
const PREFIX_EXTENSION_EVEN: u8 = 0;

/// Prefix for odd-nibbled extension node paths.
const PREFIX_EXTENSION_ODD: u8 = 1;

/// Prefix for even-nibbled leaf node paths.
const PREFIX_LEAF_EVEN: u8 = 2;

/// Prefix for odd-nibbled leaf node paths.
const PREFIX_LEAF_ODD: u8 = 3;

/// A reference to a child [TrieNode].
///
/// Nodes whose RLP encoding is 32 bytes or longer are referenced by the keccak hash of that
/// encoding and live in the node store; shorter nodes are inlined into their parent verbatim.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum NodeRef {
    /// No child present.
    Empty,
    /// The keccak hash of the child node's RLP encoding.
    Hash(B256),
    /// The raw RLP encoding of a child that is shorter than 32 bytes.
    Inline(Vec<u8>),
}

impl NodeRef {
    /// Returns `true` if no child is present.
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The length of this reference within an enclosing RLP list payload.
    pub fn rlp_payload_length(&self) -> usize {
        match self {
            Self::Empty => 1,
            Self::Hash(_) => 33,
            Self::Inline(raw) => raw.len(),
        }
    }

    fn encode_into(&self, out: &mut dyn BufMut) {
        match self {
            Self::Empty => out.put_u8(EMPTY_STRING_CODE),
            Self::Hash(hash) => hash.encode(out),
            // Inlined children are spliced in verbatim; they carry their own RLP header.
            Self::Inline(raw) => out.put_slice(raw),
        }
    }

    fn decode_from(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let &first = buf.first().ok_or(alloy_rlp::Error::InputTooShort)?;
        if first == EMPTY_STRING_CODE {
            *buf = &buf[1..];
            return Ok(Self::Empty);
        }

        // A list header at this position means the child is inlined.
        let mut peek = *buf;
        let header = Header::decode(&mut peek)?;
        let consumed = buf.len() - peek.len() + header.payload_length;
        if header.list {
            let raw = buf[..consumed].to_vec();
            *buf = &buf[consumed..];
            return Ok(Self::Inline(raw));
        }

        let hash = B256::decode(buf)?;
        Ok(Self::Hash(hash))
    }
}

/// A [TrieNode] is a node within a modified Merkle Patricia Trie.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TrieNode {
    /// A leaf node holds the remainder of a key path and its value, with the encoding
    /// `rlp([encoded_path, value])`.
    Leaf {
        /// The remaining key path of the leaf.
        path: Nibbles,
        /// The value of the leaf node.
        value: Vec<u8>,
    },
    /// An extension node holds a shared path prefix and a single child, with the encoding
    /// `rlp([encoded_path, child_ref])`.
    Extension {
        /// The shared path prefix of the extension.
        prefix: Nibbles,
        /// The reference to the child node.
        child: NodeRef,
    },
    /// A branch node refers to up to 16 child nodes and an optional value, with the encoding
    /// `rlp([ v0, ..., v15, value ])`.
    Branch {
        /// The 16 child references, keyed by nibble.
        children: Box<[NodeRef; 16]>,
        /// The value held at this branch, if a key terminates here.
        value: Option<Vec<u8>>,
    },
}

impl TrieNode {
    /// Creates an empty branch node.
    pub fn empty_branch() -> Self {
        Self::Branch {
            children: Box::new(core::array::from_fn(|_| NodeRef::Empty)),
            value: None,
        }
    }

    /// RLP-encodes the node into a fresh buffer.
    pub fn rlp(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.encode(&mut out);
        out
    }

    /// Returns a reference to this node as seen from a parent: inline when the encoding is
    /// shorter than 32 bytes, otherwise the keccak hash of the encoding.
    pub fn to_ref(&self) -> NodeRef {
        let rlp = self.rlp();
        if rlp.len() < 32 {
            NodeRef::Inline(rlp)
        } else {
            NodeRef::Hash(keccak256(&rlp))
        }
    }

    /// Decodes a hex-prefix encoded path, returning the nibble path and whether the node is a
    /// leaf.
    fn decode_path(encoded: &[u8]) -> TrieResult<(Nibbles, bool)> {
        let &first = encoded.first().ok_or(TrieError::InvalidNode)?;
        let odd = match first >> 4 {
            PREFIX_EXTENSION_EVEN | PREFIX_LEAF_EVEN => false,
            PREFIX_EXTENSION_ODD | PREFIX_LEAF_ODD => true,
            _ => return Err(TrieError::InvalidNode),
        };
        let is_leaf = matches!(first >> 4, PREFIX_LEAF_EVEN | PREFIX_LEAF_ODD);

        let mut nibbles = Vec::with_capacity(encoded.len() * 2);
        if odd {
            nibbles.push(first & 0x0f);
        }
        for byte in &encoded[1..] {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0f);
        }
        Ok((Nibbles::from_nibbles_unchecked(nibbles), is_leaf))
    }

    /// Decodes a [TrieNode] from its raw RLP encoding.
    pub fn decode_raw(raw: &[u8]) -> TrieResult<Self> {
        let mut buf = raw;
        let node = Self::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(TrieError::InvalidNode);
        }
        Ok(node)
    }
}

impl Encodable for TrieNode {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Self::Leaf { path, value } => {
                let encoded_path = path.encode_path_leaf(true);
                let payload_length = encoded_path.as_slice().length() + value.as_slice().length();
                Header { list: true, payload_length }.encode(out);
                encoded_path.as_slice().encode(out);
                value.as_slice().encode(out);
            }
            Self::Extension { prefix, child } => {
                let encoded_path = prefix.encode_path_leaf(false);
                let payload_length =
                    encoded_path.as_slice().length() + child.rlp_payload_length();
                Header { list: true, payload_length }.encode(out);
                encoded_path.as_slice().encode(out);
                child.encode_into(out);
            }
            Self::Branch { children, value } => {
                let value_length =
                    value.as_ref().map_or(1, |value| value.as_slice().length());
                let payload_length = children
                    .iter()
                    .map(NodeRef::rlp_payload_length)
                    .sum::<usize>() +
                    value_length;
                Header { list: true, payload_length }.encode(out);
                for child in children.iter() {
                    child.encode_into(out);
                }
                match value {
                    Some(value) => value.as_slice().encode(out),
                    None => out.put_u8(EMPTY_STRING_CODE),
                }
            }
        }
    }

    fn length(&self) -> usize {
        let payload_length = match self {
            Self::Leaf { path, value } => {
                path.encode_path_leaf(true).as_slice().length() + value.as_slice().length()
            }
            Self::Extension { prefix, child } => {
                prefix.encode_path_leaf(false).as_slice().length() + child.rlp_payload_length()
            }
            Self::Branch { children, value } => {
                children.iter().map(NodeRef::rlp_payload_length).sum::<usize>() +
                    value.as_ref().map_or(1, |value| value.as_slice().length())
            }
        };
        payload_length + length_of_length(payload_length)
    }
}

impl Decodable for TrieNode {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        let mut payload = &buf[..header.payload_length];
        *buf = &buf[header.payload_length..];

        // Count the list items to discriminate branch from leaf/extension.
        let mut counter = payload;
        let mut items = 0usize;
        while !counter.is_empty() {
            let mut peek = counter;
            let item_header = Header::decode(&mut peek)?;
            let consumed = counter.len() - peek.len() + item_header.payload_length;
            counter = &counter[consumed..];
            items += 1;
        }

        match items {
            BRANCH_LIST_LENGTH => {
                let mut children: [NodeRef; 16] = core::array::from_fn(|_| NodeRef::Empty);
                for child in children.iter_mut() {
                    *child = NodeRef::decode_from(&mut payload)
                        .map_err(|_| alloy_rlp::Error::Custom("invalid branch child"))?;
                }
                let value = Vec::<u8>::decode(&mut payload)?;
                Ok(Self::Branch {
                    children: Box::new(children),
                    value: (!value.is_empty()).then_some(value),
                })
            }
            LEAF_OR_EXTENSION_LIST_LENGTH => {
                let encoded_path = Vec::<u8>::decode(&mut payload)?;
                let (path, is_leaf) = Self::decode_path(&encoded_path)
                    .map_err(|_| alloy_rlp::Error::Custom("invalid hex-prefix path"))?;
                if is_leaf {
                    let value = Vec::<u8>::decode(&mut payload)?;
                    Ok(Self::Leaf { path, value })
                } else {
                    let child = NodeRef::decode_from(&mut payload)
                        .map_err(|_| alloy_rlp::Error::Custom("invalid extension child"))?;
                    Ok(Self::Extension { prefix: path, child })
                }
            }
            _ => Err(alloy_rlp::Error::UnexpectedLength),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn test_decode_leaf() {
        const LEAF_RLP: [u8; 11] = hex!("ca8320646f8576657262ff");
        let node = TrieNode::decode_raw(&LEAF_RLP).unwrap();
        let TrieNode::Leaf { path, value } = &node else {
            panic!("expected leaf");
        };
        assert_eq!(path.as_slice(), &[0x6, 0x4, 0x6, 0xf]);
        assert_eq!(value, &hex!("76657262ff").to_vec());
        assert_eq!(node.rlp(), LEAF_RLP.to_vec());
    }

    #[test]
    fn test_extension_roundtrip() {
        let node = TrieNode::Extension {
            prefix: Nibbles::from_nibbles_unchecked(vec![0x0, 0x6, 0x4, 0x6, 0xf]),
            child: NodeRef::Hash(B256::repeat_byte(0x77)),
        };
        let rlp = node.rlp();
        assert_eq!(TrieNode::decode_raw(&rlp).unwrap(), node);
        assert_eq!(rlp.len(), node.length());
    }

    #[test]
    fn test_inline_child_roundtrip() {
        let inline = TrieNode::Leaf { path: Nibbles::unpack([0x05]), value: vec![0x2a] };
        let node = TrieNode::Extension {
            prefix: Nibbles::from_nibbles_unchecked(vec![0x1, 0x2]),
            child: inline.to_ref(),
        };
        let rlp = node.rlp();
        let decoded = TrieNode::decode_raw(&rlp).unwrap();
        let TrieNode::Extension { child: NodeRef::Inline(raw), .. } = &decoded else {
            panic!("expected inlined child");
        };
        assert_eq!(TrieNode::decode_raw(raw).unwrap(), inline);
    }

    #[test]
    fn test_branch_roundtrip() {
        let mut node = TrieNode::empty_branch();
        if let TrieNode::Branch { children, value } = &mut node {
            children[3] = NodeRef::Hash(B256::repeat_byte(0xaa));
            *value = Some(vec![0x42]);
        }
        let rlp = node.rlp();
        assert_eq!(TrieNode::decode_raw(&rlp).unwrap(), node);
        assert_eq!(rlp.len(), node.length());
    }

    #[test]
    fn test_hashed_ref_over_32_bytes() {
        let node = TrieNode::Leaf {
            path: Nibbles::unpack([0xab; 8]),
            value: vec![0x11; 40],
        };
        assert!(matches!(node.to_ref(), NodeRef::Hash(_)));

        let small = TrieNode::Leaf { path: Nibbles::unpack([0xab]), value: vec![0x11] };
        assert!(matches!(small.to_ref(), NodeRef::Inline(_)));
    }
}
