//! The `net_*` surface. There is no networking; the answers are constants.

use jsonrpsee::{
    core::{async_trait, RpcResult},
    proc_macros::rpc,
};

/// The `net` namespace.
#[rpc(server, namespace = "net")]
pub trait NetApi {
    /// Returns the network id.
    #[method(name = "version")]
    async fn version(&self) -> RpcResult<String>;

    /// Returns the number of connected peers. Always zero.
    #[method(name = "peerCount")]
    async fn peer_count(&self) -> RpcResult<String>;

    /// Returns `true`: the RPC listener is the only "network" surface.
    #[method(name = "listening")]
    async fn listening(&self) -> RpcResult<bool>;
}

/// The `net` namespace implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetRpc;

#[async_trait]
impl NetApiServer for NetRpc {
    async fn version(&self) -> RpcResult<String> {
        Ok("1".to_string())
    }

    async fn peer_count(&self) -> RpcResult<String> {
        Ok("0x0".to_string())
    }

    async fn listening(&self) -> RpcResult<bool> {
        Ok(true)
    }
}
