//! RPC error mapping.

use jsonrpsee::types::ErrorObjectOwned;
use veda_executor::ExecutorError;

/// The JSON-RPC error code used for domain errors, following the classic `-32000` family.
const DOMAIN_ERROR_CODE: i32 = -32000;

/// The JSON-RPC error code for unimplemented methods.
const METHOD_NOT_IMPLEMENTED_CODE: i32 = -32601;

/// Errors surfaced to RPC clients.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// A requested record is not part of the canonical chain.
    #[error("{0}")]
    NotFound(String),
    /// The request was malformed.
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    /// The method exists in the dialect but is not supported by this node.
    #[error("Method not implemented: {0}")]
    NotImplemented(&'static str),
    /// A block import is in progress and the read path timed out waiting for it.
    #[error("Node is busy importing a block")]
    Busy,
    /// The execution layer failed.
    #[error("{0}")]
    Execution(#[from] ExecutorError),
    /// A read-only call halted with a computation error.
    #[error("{0}")]
    Call(String),
    /// An internal invariant failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RpcError> for ErrorObjectOwned {
    fn from(err: RpcError) -> Self {
        let code = match err {
            RpcError::NotImplemented(_) => METHOD_NOT_IMPLEMENTED_CODE,
            _ => DOMAIN_ERROR_CODE,
        };
        ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
    }
}

impl From<veda_executor::ChainDbError> for RpcError {
    fn from(err: veda_executor::ChainDbError) -> Self {
        Self::Execution(ExecutorError::ChainDb(err))
    }
}

impl From<veda_state::StateError> for RpcError {
    fn from(err: veda_state::StateError) -> Self {
        Self::Execution(ExecutorError::State(err))
    }
}

/// Shorthand for the conversion at RPC method boundaries.
pub(crate) fn into_rpc_err(err: impl Into<RpcError>) -> ErrorObjectOwned {
    err.into().into()
}
