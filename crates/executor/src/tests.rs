//! End-to-end block application tests over an in-memory store.

use crate::{
    execute_call, initialize_chain, BlockDescriptor, BlockExecutor, CallRequest, ChainDb,
    ExecutorError, TransactionLocation, ValidationError,
};
use alloy_primitives::{hex, Address, Bytes, B256, U256};
use veda_kv::{KeyValueStore, MemoryKeyValueStore, SharedKeyValueStore};
use veda_primitives::{
    constants::BLOCK_GAS_LIMIT, generate_contract_address, Transaction, EMPTY_ROOT_HASH,
};
use veda_state::State;

const SENDER: Address = Address::repeat_byte(0xff);

fn setup() -> (ChainDb, BlockExecutor, SharedKeyValueStore) {
    let store = veda_kv::shared(MemoryKeyValueStore::new());
    let db = ChainDb::new(store.clone());
    initialize_chain(&db).unwrap();
    let executor = BlockExecutor::new(db.clone()).unwrap();
    (db, executor, store)
}

fn descriptor(number: u64, seed: u8) -> BlockDescriptor {
    BlockDescriptor {
        block_hash: B256::repeat_byte(seed),
        block_number: number,
        mix_hash: B256::repeat_byte(0x6f),
        timestamp: veda_primitives::constants::GENESIS_TIMESTAMP + number * 12,
    }
}

fn tx(nonce: u64, to: Option<Address>, data: &[u8], hash_seed: u8) -> Transaction {
    Transaction {
        nonce,
        gas: BLOCK_GAS_LIMIT,
        to,
        data: Bytes::copy_from_slice(data),
        veda_sender: SENDER,
        veda_txhash: B256::repeat_byte(hash_seed),
    }
}

#[test]
fn test_empty_block_keeps_parent_state_root() {
    let (db, mut executor, _) = setup();
    let parent_root = executor.parent().state_root;

    let (block, receipts, _) = executor.execute_block(&descriptor(1, 0x01), vec![]).unwrap();

    assert_eq!(block.header.state_root, parent_root);
    assert_eq!(block.header.transaction_root, EMPTY_ROOT_HASH);
    assert_eq!(block.header.receipt_root, EMPTY_ROOT_HASH);
    assert_eq!(block.header.gas_used, 0);
    assert!(receipts.is_empty());
    assert_eq!(db.canonical_head().unwrap().hash(), B256::repeat_byte(0x01));
}

#[test]
fn test_identity_precompile_call() {
    let (_, mut executor, _) = setup();

    let tx = tx(0, Some(Address::with_last_byte(0x04)), &hex!("1234"), 0xa1);
    let (block, receipts, computations) =
        executor.execute_block(&descriptor(1, 0x01), vec![tx]).unwrap();

    assert_eq!(receipts.len(), 1);
    assert!(receipts[0].success);
    assert!(receipts[0].logs.is_empty());
    // Intrinsic 21_000 + 2 non-zero data bytes + the identity fee of 18.
    assert_eq!(block.header.gas_used, 21_000 + 2 * 16 + 18);
    assert_eq!(computations[0].output.as_ref(), hex!("1234"));
    // Block identity is the descriptor's hash, never a hash of the header.
    assert_eq!(block.header.veda_block_hash, B256::repeat_byte(0x01));
}

#[test]
fn test_nonce_mismatch_drops_transaction_silently() {
    let (db, mut executor, _) = setup();

    let first = tx(0, Some(Address::with_last_byte(0x04)), &[], 0xa1);
    executor.execute_block(&descriptor(1, 0x01), vec![first.clone()]).unwrap();
    let root_after_first = db.canonical_head().unwrap().state_root;

    // Replay the same nonce: the transaction is dropped and the block applies empty.
    let replay = tx(0, Some(Address::with_last_byte(0x04)), &[], 0xa2);
    let (block, receipts, _) = executor.execute_block(&descriptor(2, 0x02), vec![replay]).unwrap();

    assert!(block.transactions.is_empty());
    assert!(receipts.is_empty());
    assert_eq!(block.header.state_root, root_after_first);
    assert_eq!(db.transaction_location(B256::repeat_byte(0xa2)).unwrap(), None);
}

#[test]
fn test_failed_transaction_still_bumps_nonce() {
    let (db, mut executor, _) = setup();

    // Initcode that immediately reverts: the creation fails with a failure receipt.
    let failing_create = tx(0, None, &hex!("60006000fd"), 0xa1);
    let (block, receipts, _) =
        executor.execute_block(&descriptor(1, 0x01), vec![failing_create]).unwrap();

    assert_eq!(receipts.len(), 1);
    assert!(!receipts[0].success);
    assert_eq!(block.transactions.len(), 1);

    let head = db.canonical_head().unwrap();
    let mut state = State::new(head.state_root, db.clone());
    assert_eq!(state.get_nonce(SENDER).unwrap(), 1);
}

/// Initcode that stores 1 at slots 0..3, then deploys a runtime which zeroes those slots
/// and self-destructs.
fn cleaner_contract_initcode() -> Vec<u8> {
    let mut runtime = Vec::new();
    for slot in 0..3u8 {
        runtime.extend_from_slice(&[0x60, 0x00, 0x60, slot, 0x55]);
    }
    runtime.push(0x73);
    runtime.extend_from_slice(&[0x22; 20]);
    runtime.push(0xff);
    assert_eq!(runtime.len(), 37);

    let mut init = Vec::new();
    for slot in 0..3u8 {
        init.extend_from_slice(&[0x60, 0x01, 0x60, slot, 0x55]);
    }
    // CODECOPY(0, 0x1b, 0x25); RETURN(0, 0x25)
    init.extend_from_slice(&hex!("6025601b60003960256000f3"));
    assert_eq!(init.len(), 27);
    init.extend_from_slice(&runtime);
    init
}

#[test]
fn test_selfdestruct_refund_is_capped_at_half() {
    let (db, mut executor, _) = setup();

    let deploy = tx(0, None, &cleaner_contract_initcode(), 0xa1);
    executor.execute_block(&descriptor(1, 0x01), vec![deploy]).unwrap();
    let contract = generate_contract_address(SENDER, 0);

    let call = tx(1, Some(contract), &[], 0xa2);
    let (block, receipts, computations) =
        executor.execute_block(&descriptor(2, 0x02), vec![call.clone()]).unwrap();

    assert!(receipts[0].success);
    // Gross refund: 3 storage clears plus one self-destruct, far above the cap.
    let raw_used = call.gas - computations[0].gas_remaining;
    assert_eq!(block.header.gas_used, raw_used - raw_used / 2);

    // The contract is gone and its storage with it.
    let head = db.canonical_head().unwrap();
    let mut state = State::new(head.state_root, db.clone());
    assert!(!state.account_exists(contract).unwrap());
    assert_eq!(state.get_storage(contract, U256::ZERO).unwrap(), U256::ZERO);
}

/// Initcode deploying a runtime that returns the constant 0x42.
fn constant_contract_initcode() -> Vec<u8> {
    // Runtime: PUSH1 0x42, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN (10 bytes), deployed
    // with the PUSH10 + MSTORE idiom: the runtime lands right-aligned at offset 22.
    hex!("69604260005260206000f3600052600a6016f3").to_vec()
}

#[test]
fn test_deploy_then_read_only_call() {
    let (db, mut executor, _) = setup();

    let deploy = tx(0, None, &constant_contract_initcode(), 0xa1);
    let (_, receipts, _) = executor.execute_block(&descriptor(1, 0x01), vec![deploy]).unwrap();
    assert!(receipts[0].success);

    let contract = generate_contract_address(SENDER, 0);
    let head = db.canonical_head().unwrap();
    let mut state = State::new(head.state_root, db.clone());
    assert_eq!(
        state.get_code(contract).unwrap().as_ref(),
        hex!("604260005260206000f3")
    );

    let computation = execute_call(
        &db,
        &head,
        &CallRequest { sender: SENDER, to: Some(contract), data: Bytes::new(), gas: None },
    )
    .unwrap();
    assert!(computation.is_success());
    assert_eq!(U256::from_be_slice(&computation.output), U256::from(0x42));
}

#[test]
fn test_canonical_lookups_across_blocks() {
    let (db, mut executor, _) = setup();

    let tx1 = tx(0, Some(Address::with_last_byte(0x04)), &[], 0xa1);
    executor.execute_block(&descriptor(1, 0x01), vec![tx1]).unwrap();
    executor.execute_block(&descriptor(2, 0x02), vec![]).unwrap();
    executor.execute_block(&descriptor(3, 0x03), vec![]).unwrap();

    assert_eq!(db.canonical_hash(2).unwrap(), Some(B256::repeat_byte(0x02)));
    assert_eq!(db.canonical_head().unwrap().block_number, 3);
    assert_eq!(
        db.transaction_location(B256::repeat_byte(0xa1)).unwrap(),
        Some(TransactionLocation { block_number: 1, index: 0 })
    );
    let body = db.block_transactions(B256::repeat_byte(0x01)).unwrap().unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].hash(), B256::repeat_byte(0xa1));
}

#[test]
fn test_stale_timestamp_is_rejected() {
    let (_, mut executor, _) = setup();

    let mut stale = descriptor(1, 0x01);
    stale.timestamp = veda_primitives::constants::GENESIS_TIMESTAMP;
    let err = executor.execute_block(&stale, vec![]).unwrap_err();
    assert!(matches!(
        err,
        ExecutorError::Validation(ValidationError::Timestamp { .. })
    ));
}

#[test]
fn test_corrupted_trie_node_surfaces_missing_node() {
    let (db, mut executor, store) = setup();

    let first = tx(0, Some(Address::with_last_byte(0x04)), &[], 0xa1);
    executor.execute_block(&descriptor(1, 0x01), vec![first]).unwrap();

    // Drop the world-trie root node from the store.
    let root = db.canonical_head().unwrap().state_root;
    store.write().unwrap().delete(root.as_slice()).unwrap();

    let mut state = State::new(root, db);
    let err = state.get_nonce(SENDER).unwrap_err();
    assert!(err.is_missing_node());
}

#[test]
fn test_block_gas_accumulates_across_transactions() {
    let (_, mut executor, _) = setup();

    let tx1 = tx(0, Some(Address::with_last_byte(0x04)), &[], 0xa1);
    let tx2 = tx(1, Some(Address::with_last_byte(0x04)), &[], 0xa2);
    let (block, receipts, _) =
        executor.execute_block(&descriptor(1, 0x01), vec![tx1, tx2]).unwrap();

    // Identity with empty input costs 15; cumulative gas is strictly monotonic.
    assert_eq!(receipts[0].cumulative_gas_used, 21_015);
    assert_eq!(receipts[1].cumulative_gas_used, 2 * 21_015);
    assert_eq!(block.header.gas_used, receipts[1].cumulative_gas_used);
}
