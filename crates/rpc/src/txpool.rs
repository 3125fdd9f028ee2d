//! The `txpool_*` surface. There is no transaction pool; every answer is empty.

use jsonrpsee::{
    core::{async_trait, RpcResult},
    proc_macros::rpc,
};
use serde_json::{json, Value};

/// The `txpool` namespace.
#[rpc(server, namespace = "txpool")]
pub trait TxPoolApi {
    /// Returns the pool content. Always empty.
    #[method(name = "content")]
    async fn content(&self) -> RpcResult<Value>;

    /// Returns the pool summary. Always empty.
    #[method(name = "inspect")]
    async fn inspect(&self) -> RpcResult<Value>;

    /// Returns the pool counters. Always empty.
    #[method(name = "status")]
    async fn status(&self) -> RpcResult<Value>;

    /// Returns the pool content for one sender. Always empty.
    #[method(name = "contentFrom")]
    async fn content_from(&self, address: String) -> RpcResult<Value>;
}

/// The `txpool` namespace implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TxPoolRpc;

#[async_trait]
impl TxPoolApiServer for TxPoolRpc {
    async fn content(&self) -> RpcResult<Value> {
        Ok(json!([]))
    }

    async fn inspect(&self) -> RpcResult<Value> {
        Ok(json!([]))
    }

    async fn status(&self) -> RpcResult<Value> {
        Ok(json!({ "pending": [], "queued": [] }))
    }

    async fn content_from(&self, _address: String) -> RpcResult<Value> {
        Ok(json!([]))
    }
}
