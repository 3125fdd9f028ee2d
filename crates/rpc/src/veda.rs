//! The `veda_*` surface: node-local introspection.

use crate::{errors::into_rpc_err, node::NodeHandle, types::{hex_bytes, LatestBlock}};
use jsonrpsee::{
    core::{async_trait, RpcResult},
    proc_macros::rpc,
};

/// The `veda` namespace.
#[rpc(server, namespace = "veda")]
pub trait VedaApi {
    /// A liveness probe.
    #[method(name = "getHeartBeat")]
    async fn get_heart_beat(&self) -> RpcResult<String>;

    /// Returns the canonical tip descriptor, mirroring the sync surface's
    /// `get_latest_block`.
    #[method(name = "getLatestBlock")]
    async fn get_latest_block(&self) -> RpcResult<LatestBlock>;
}

/// The `veda` namespace implementation.
#[derive(Debug)]
pub struct VedaRpc {
    node: NodeHandle,
}

impl VedaRpc {
    /// Creates the veda surface over `node`.
    pub const fn new(node: NodeHandle) -> Self {
        Self { node }
    }
}

#[async_trait]
impl VedaApiServer for VedaRpc {
    async fn get_heart_beat(&self) -> RpcResult<String> {
        Ok("OK".to_string())
    }

    async fn get_latest_block(&self) -> RpcResult<LatestBlock> {
        let head = self.node.head().map_err(into_rpc_err)?;
        Ok(LatestBlock {
            veda_block_hash: hex_bytes(head.veda_block_hash.as_slice()),
            veda_block_number: head.veda_block_number,
            veda_timestamp: head.veda_timestamp,
        })
    }
}
