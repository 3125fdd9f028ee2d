//! HTTP server assembly for the read and sync surfaces.

use crate::{
    errors::RpcError,
    eth::{EthApiServer, EthRpc},
    net::{NetApiServer, NetRpc},
    node::NodeHandle,
    sync::{SyncApiServer, SyncRpc},
    trace::{TraceApiServer, TraceRpc},
    txpool::{TxPoolApiServer, TxPoolRpc},
    veda::{VedaApiServer, VedaRpc},
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Which read-RPC namespaces are served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiSet {
    /// Every namespace.
    All,
    /// An explicit selection, as parsed from a comma-separated list.
    Selection(Vec<String>),
}

impl ApiSet {
    /// Parses `--enable-http-apis` syntax: `*` or a comma-separated namespace list.
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == "*" {
            return Self::All;
        }
        Self::Selection(
            raw.split(',')
                .map(|name| name.trim().to_ascii_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    fn enabled(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Selection(names) => names.iter().any(|enabled| enabled == name),
        }
    }
}

impl Default for ApiSet {
    fn default() -> Self {
        Self::All
    }
}

fn cors_layer() -> CorsLayer {
    // CORS is on and any origin is allowed.
    CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any)
}

/// Starts the public read server, exposing the namespaces selected by `apis`.
pub async fn start_read_server(
    node: NodeHandle,
    addr: SocketAddr,
    apis: &ApiSet,
) -> Result<ServerHandle, RpcError> {
    let middleware = tower::ServiceBuilder::new().layer(cors_layer());
    let server = Server::builder()
        .set_http_middleware(middleware)
        .build(addr)
        .await
        .map_err(|err| RpcError::Internal(err.to_string()))?;

    let mut module = RpcModule::new(());
    if apis.enabled("eth") {
        module
            .merge(EthRpc::new(node.clone()).into_rpc())
            .map_err(|err| RpcError::Internal(err.to_string()))?;
    }
    if apis.enabled("net") {
        module
            .merge(NetRpc.into_rpc())
            .map_err(|err| RpcError::Internal(err.to_string()))?;
    }
    if apis.enabled("txpool") {
        module
            .merge(TxPoolRpc.into_rpc())
            .map_err(|err| RpcError::Internal(err.to_string()))?;
    }
    if apis.enabled("trace") {
        module
            .merge(TraceRpc::new(node.clone()).into_rpc())
            .map_err(|err| RpcError::Internal(err.to_string()))?;
    }
    if apis.enabled("veda") {
        module
            .merge(VedaRpc::new(node).into_rpc())
            .map_err(|err| RpcError::Internal(err.to_string()))?;
    }

    info!(target: "rpc", %addr, "Read RPC server listening");
    Ok(server.start(module))
}

/// Starts the internal sync server: the single write entry point.
pub async fn start_sync_server(
    node: NodeHandle,
    addr: SocketAddr,
) -> Result<ServerHandle, RpcError> {
    let server = Server::builder()
        .build(addr)
        .await
        .map_err(|err| RpcError::Internal(err.to_string()))?;

    let module = SyncRpc::new(node).into_rpc();

    info!(target: "rpc", %addr, "Sync RPC server listening");
    Ok(server.start(module))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_set_parsing() {
        assert_eq!(ApiSet::parse("*"), ApiSet::All);
        let set = ApiSet::parse("eth, net,txpool");
        assert!(set.enabled("eth"));
        assert!(set.enabled("net"));
        assert!(set.enabled("txpool"));
        assert!(!set.enabled("trace"));
    }
}
