#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub use alloy_trie::{Nibbles, EMPTY_ROOT_HASH};

mod node;
pub use node::{NodeRef, TrieNode};

mod trie;
pub use trie::{EmptyNodeSource, NodeSource, Trie};

mod ordered;
pub use ordered::{ordered_trie_root, ordered_trie_root_with_encoder};

mod errors;
pub use errors::{TrieError, TrieResult};
