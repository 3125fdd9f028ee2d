//! Index tries keyed by `rlp(index)`, used for the transaction and receipt roots.

use crate::{EmptyNodeSource, Trie, TrieResult};
use alloy_primitives::B256;
use alloy_rlp::Encodable;

/// Computes the root of a trie mapping `rlp(index) -> encoder(item)` over the items in order.
pub fn ordered_trie_root_with_encoder<T, F>(items: &[T], mut encoder: F) -> TrieResult<B256>
where
    F: FnMut(&T, &mut Vec<u8>),
{
    let mut trie = Trie::empty(EmptyNodeSource);
    for (index, item) in items.iter().enumerate() {
        let mut key = Vec::with_capacity(4);
        index.encode(&mut key);
        let mut value = Vec::new();
        encoder(item, &mut value);
        trie.insert(&key, value)?;
    }
    Ok(trie.root())
}

/// Computes the root of a trie mapping `rlp(index) -> rlp(item)` over the items in order.
pub fn ordered_trie_root<T: Encodable>(items: &[T]) -> TrieResult<B256> {
    ordered_trie_root_with_encoder(items, |item, out| item.encode(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EMPTY_ROOT_HASH;
    use alloy_primitives::Bytes;

    #[test]
    fn test_empty_list_is_empty_root() {
        assert_eq!(ordered_trie_root::<Bytes>(&[]).unwrap(), EMPTY_ROOT_HASH);
    }

    #[test]
    fn test_matches_reference_implementation() {
        // Index keys share nibble prefixes past 0x7f entries, exercising branch values.
        let items: Vec<Bytes> =
            (0u16..200).map(|i| Bytes::from(i.to_be_bytes().to_vec())).collect();
        let root = ordered_trie_root(&items).unwrap();
        let reference = alloy_trie::root::ordered_trie_root_with_encoder(&items, |item, out| {
            item.encode(out)
        });
        assert_eq!(root, reference);
    }
}
