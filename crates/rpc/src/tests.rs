//! In-process tests of the sync and read surfaces.

use crate::{
    eth::{EthApiServer, EthRpc},
    events::ChainEvent,
    node::{Node, NodeHandle},
    sync::{SyncApiServer, SyncRpc},
    trace::{TraceApiServer, TraceRpc},
    types::{RpcCallRequest, SyncBlockModel, SyncTransactionModel},
};
use alloy_primitives::{hex, U256};
use veda_executor::{initialize_chain, ChainDb};
use veda_kv::MemoryKeyValueStore;
use veda_primitives::constants::GENESIS_TIMESTAMP;

fn hexstr(byte: &str, len: usize) -> String {
    format!("0x{}", byte.repeat(len))
}

fn node() -> NodeHandle {
    let db = ChainDb::new(veda_kv::shared(MemoryKeyValueStore::new()));
    initialize_chain(&db).unwrap();
    Node::new(db, U256::from(crate::node::DEFAULT_GAS_PRICE)).unwrap()
}

fn descriptor(number: u64, seed: &str) -> SyncBlockModel {
    SyncBlockModel {
        block_hash: hexstr(seed, 32),
        block_number: number,
        mix_hash: hexstr("6f", 32),
        timestamp: GENESIS_TIMESTAMP + number * 12,
    }
}

fn identity_call_tx(nonce: u64, hash_seed: &str) -> SyncTransactionModel {
    SyncTransactionModel {
        sender: hexstr("ff", 20),
        to: hexstr("00", 19) + "04",
        nonce,
        data: "0x1234".to_string(),
        tx_hash: hexstr(hash_seed, 32),
    }
}

#[tokio::test]
async fn test_sync_then_read_block() {
    let node = node();
    let sync = SyncRpc::new(node.clone());
    let eth = EthRpc::new(node.clone());

    sync.sync(descriptor(1, "01"), vec![identity_call_tx(0, "a1")]).await.unwrap();

    let block = eth.get_block_by_number("0x1".to_string(), false).await.unwrap();
    assert_eq!(block.hash, hexstr("01", 32));
    assert_eq!(block.number, "0x1");
    assert_eq!(block.transactions, vec![serde_json::Value::String(hexstr("a1", 32))]);
    assert_eq!(block.miner, hexstr("00", 20));
    assert_eq!(block.uncles, Vec::<String>::new());

    assert_eq!(eth.block_number().await.unwrap(), "0x1");
}

#[tokio::test]
async fn test_get_latest_block_descriptor() {
    let node = node();
    let sync = SyncRpc::new(node.clone());

    sync.sync(descriptor(1, "01"), vec![]).await.unwrap();
    sync.sync(descriptor(2, "02"), vec![]).await.unwrap();

    let latest = sync.get_latest_block().await.unwrap();
    assert_eq!(latest.veda_block_hash, hexstr("02", 32));
    assert_eq!(latest.veda_block_number, 2);
    assert_eq!(latest.veda_timestamp, GENESIS_TIMESTAMP + 24);
}

#[tokio::test]
async fn test_sync_broadcasts_lifecycle_events() {
    let node = node();
    let mut events = node.events.subscribe();
    let sync = SyncRpc::new(node.clone());

    sync.sync(descriptor(1, "01"), vec![]).await.unwrap();

    assert!(matches!(events.recv().await.unwrap(), ChainEvent::NewBlockImportStarted { .. }));
    assert!(matches!(events.recv().await.unwrap(), ChainEvent::NewBlockImportFinished { .. }));
    assert!(!node.gate.is_blocked());
}

#[tokio::test]
async fn test_sync_rejects_wrong_block_number() {
    let node = node();
    let mut events = node.events.subscribe();
    let sync = SyncRpc::new(node.clone());

    let err = sync.sync(descriptor(5, "05"), vec![]).await.unwrap_err();
    assert!(err.message().contains("block #1"));

    assert!(matches!(events.recv().await.unwrap(), ChainEvent::NewBlockImportStarted { .. }));
    assert!(matches!(
        events.recv().await.unwrap(),
        ChainEvent::NewBlockImportCanceled { .. }
    ));
    assert!(!node.gate.is_blocked());

    // The node recovers: the correct next block still imports.
    sync.sync(descriptor(1, "01"), vec![]).await.unwrap();
}

#[tokio::test]
async fn test_sync_rejects_stale_timestamp() {
    let node = node();
    let sync = SyncRpc::new(node.clone());

    let mut stale = descriptor(1, "01");
    stale.timestamp = GENESIS_TIMESTAMP;
    let err = sync.sync(stale, vec![]).await.unwrap_err();
    assert!(err.message().contains("timestamp"));
}

#[tokio::test]
async fn test_transaction_and_receipt_lookup() {
    let node = node();
    let sync = SyncRpc::new(node.clone());
    let eth = EthRpc::new(node.clone());

    sync.sync(descriptor(1, "01"), vec![identity_call_tx(0, "a1")]).await.unwrap();

    let tx = eth.get_transaction_by_hash(hexstr("a1", 32)).await.unwrap();
    assert_eq!(tx.block_number.as_deref(), Some("0x1"));
    assert_eq!(tx.from, hexstr("ff", 20));
    assert_eq!(tx.value, "0x0");

    let receipt = eth.get_transaction_receipt(hexstr("a1", 32)).await.unwrap();
    assert_eq!(receipt.status, "0x01");
    assert_eq!(receipt.block_hash, hexstr("01", 32));
    assert_eq!(receipt.transaction_index, "0x0");
    // Intrinsic plus the identity precompile fee.
    assert_eq!(receipt.cumulative_gas_used, format!("{:#x}", 21_000 + 2 * 16 + 18));

    let missing = eth.get_transaction_by_hash(hexstr("bb", 32)).await.unwrap_err();
    assert!(missing.message().contains("not in the canonical chain"));
}

/// Initcode deploying a runtime that returns the constant 0x42.
fn constant_contract_deploy(nonce: u64, hash_seed: &str) -> SyncTransactionModel {
    SyncTransactionModel {
        sender: hexstr("ff", 20),
        to: String::new(),
        nonce,
        data: format!("0x{}", hex::encode(hex!("69604260005260206000f3600052600a6016f3"))),
        tx_hash: hexstr(hash_seed, 32),
    }
}

#[tokio::test]
async fn test_deploy_call_estimate_and_trace() {
    let node = node();
    let sync = SyncRpc::new(node.clone());
    let eth = EthRpc::new(node.clone());
    let trace = TraceRpc::new(node.clone());

    sync.sync(descriptor(1, "01"), vec![constant_contract_deploy(0, "a1")]).await.unwrap();

    let receipt = eth.get_transaction_receipt(hexstr("a1", 32)).await.unwrap();
    let contract = receipt.contract_address.clone().unwrap();
    assert_eq!(receipt.to, "0x");

    let code = eth.get_code(contract.clone(), None).await.unwrap();
    assert_eq!(code, format!("0x{}", hex::encode(hex!("604260005260206000f3"))));

    let output = eth
        .call(
            RpcCallRequest { to: Some(contract.clone()), ..Default::default() },
            None,
        )
        .await
        .unwrap();
    assert_eq!(
        U256::from_be_slice(&hex::decode(&output).unwrap()),
        U256::from(0x42)
    );

    let estimate = eth
        .estimate_gas(
            RpcCallRequest { to: Some(contract.clone()), ..Default::default() },
            None,
        )
        .await
        .unwrap();
    assert!(crate::types::parse_hex_u64(&estimate).unwrap() > 21_000);

    let traces = trace.transaction(hexstr("a1", 32)).await.unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0]["type"], "create");
    assert_eq!(traces[0]["result"]["address"], contract);
    assert_eq!(traces[0]["traceAddress"], serde_json::json!([]));
}

#[tokio::test]
async fn test_send_raw_transaction_is_unsupported() {
    let node = node();
    let eth = EthRpc::new(node);
    let err = eth.send_raw_transaction("0x00".to_string()).await.unwrap_err();
    assert!(err.message().contains("not supported"));
}

#[tokio::test]
async fn test_nonce_visible_through_get_transaction_count() {
    let node = node();
    let sync = SyncRpc::new(node.clone());
    let eth = EthRpc::new(node.clone());

    assert_eq!(eth.get_transaction_count(hexstr("ff", 20), None).await.unwrap(), "0x0");
    sync.sync(descriptor(1, "01"), vec![identity_call_tx(0, "a1")]).await.unwrap();
    assert_eq!(eth.get_transaction_count(hexstr("ff", 20), None).await.unwrap(), "0x1");
}
