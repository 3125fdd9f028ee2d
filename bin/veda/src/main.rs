//! The Veda node entry point.

use alloy_primitives::U256;
use anyhow::{anyhow, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use veda_executor::{initialize_chain, ChainDb};
use veda_kv::DiskKeyValueStore;
use veda_rpc::{ApiSet, Node};

mod cli;
use cli::{DataDirLayout, VedaArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let args = VedaArgs::parse();
    init_tracing(&args.log_level)?;

    let data_dir = args.resolved_data_dir();
    let layout = DataDirLayout::create(&data_dir, &args.profile)?;
    info!(target: "veda", data_dir = %data_dir.display(), "Starting Veda node");

    // Open the store and bring the chain to a known tip.
    let store = DiskKeyValueStore::open(layout.chain_dir.clone())
        .map_err(|err| anyhow!("failed to open chain database: {err}"))?;
    let db = ChainDb::new(veda_kv::shared(store));
    let head = initialize_chain(&db).map_err(|err| anyhow!("chain init failed: {err}"))?;
    info!(
        target: "veda",
        block_number = head.block_number,
        block_hash = %head.hash(),
        "Chain ready",
    );

    let node = Node::new(db, U256::from(args.gas_price))
        .map_err(|err| anyhow!("node init failed: {err}"))?;

    let mut server_handles = Vec::new();
    if args.disable_rpc {
        warn!(target: "veda", "Public read RPC is disabled");
    } else {
        let addr: SocketAddr = format!("{}:{}", args.http_listen_address, args.http_port)
            .parse()
            .map_err(|err| anyhow!("invalid read RPC listen address: {err}"))?;
        let apis = ApiSet::parse(&args.enable_http_apis);
        let handle = veda_rpc::start_read_server(node.clone(), addr, &apis)
            .await
            .map_err(|err| anyhow!("failed to start read RPC server: {err}"))?;
        server_handles.push(handle);
    }

    if args.disable_internal_rpc {
        warn!(target: "veda", "Internal sync RPC is disabled; this node cannot advance");
    } else {
        let addr: SocketAddr = format!(
            "{}:{}",
            args.internal_rpc_http_listen_address, args.internal_rpc_http_port
        )
        .parse()
        .map_err(|err| anyhow!("invalid sync RPC listen address: {err}"))?;
        let handle = veda_rpc::start_sync_server(node.clone(), addr)
            .await
            .map_err(|err| anyhow!("failed to start sync RPC server: {err}"))?;
        server_handles.push(handle);
    }

    tokio::signal::ctrl_c().await?;
    info!(target: "veda", "Shutdown signal received");

    // Let an in-flight import finish: taking the executor lock serializes behind it.
    drop(node.executor.lock().await);
    for handle in server_handles {
        let _ = handle.stop();
    }
    info!(target: "veda", "Shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level)
        .map_err(|err| anyhow!("invalid log level {log_level:?}: {err}"))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
