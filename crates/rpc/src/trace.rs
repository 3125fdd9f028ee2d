//! The `trace_*` surface: classic parity-shape traces recovered by re-executing the
//! enclosing block in a costless state.

use crate::{
    errors::{into_rpc_err, RpcError},
    node::NodeHandle,
    types::{hex_bytes, hex_u64},
};
use jsonrpsee::{
    core::{async_trait, RpcResult},
    proc_macros::rpc,
};
use serde_json::{json, Value};
use veda_evm::Computation;
use veda_executor::replay_block;
use veda_primitives::{SealedHeader, Transaction};

/// The `trace` namespace.
#[rpc(server, namespace = "trace")]
pub trait TraceApi {
    /// Returns the flat call trace of a canonical transaction.
    #[method(name = "transaction")]
    async fn transaction(&self, hash: String) -> RpcResult<Vec<Value>>;
}

/// The `trace` namespace implementation.
#[derive(Debug)]
pub struct TraceRpc {
    node: NodeHandle,
}

impl TraceRpc {
    /// Creates the trace surface over `node`.
    pub const fn new(node: NodeHandle) -> Self {
        Self { node }
    }
}

/// Renders one computation frame and, recursively, its children into the flat parity
/// shape.
fn trace_computation(
    computation: &Computation,
    parent: &SealedHeader,
    tx: &Transaction,
    tx_index: u64,
    trace_address: Vec<usize>,
    out: &mut Vec<Value>,
) {
    let mut action = json!({
        "from": hex_bytes(computation.sender.as_slice()),
        "gas": hex_u64(computation.gas),
        "value": "0x0",
    });
    let mut result = json!({
        "gasUsed": hex_u64(computation.gas_used()),
    });

    if computation.is_create() {
        action["init"] = Value::String(hex_bytes(&computation.input));
        result["code"] = Value::String(hex_bytes(&computation.output));
        result["address"] =
            Value::String(hex_bytes(computation.storage_address.as_slice()));
    } else {
        action["callType"] = Value::String(computation.call_type.wire_name().to_string());
        action["input"] = Value::String(hex_bytes(&computation.input));
        action["to"] = Value::String(hex_bytes(computation.storage_address.as_slice()));
        result["output"] = Value::String(hex_bytes(&computation.output));
    }

    let mut entry = json!({
        "action": action,
        "blockHash": hex_bytes(parent.hash().as_slice()),
        "blockNumber": parent.block_number,
        "result": result,
        "subtraces": computation.children.len(),
        "traceAddress": trace_address.clone(),
        "transactionHash": hex_bytes(tx.hash().as_slice()),
        "transactionPosition": tx_index,
        "type": if computation.is_create() { "create" } else { "call" },
    });
    if let Some(error) = &computation.error {
        entry["error"] = Value::String(error.to_string());
    }
    out.push(entry);

    for (child_index, child) in computation.children.iter().enumerate() {
        let mut child_address = trace_address.clone();
        child_address.push(child_index);
        trace_computation(child, parent, tx, tx_index, child_address, out);
    }
}

#[async_trait]
impl TraceApiServer for TraceRpc {
    async fn transaction(&self, hash: String) -> RpcResult<Vec<Value>> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;

        let hash = crate::types::parse_hash(&hash).ok_or_else(|| {
            into_rpc_err(RpcError::InvalidParams(format!("invalid hash: {hash}")))
        })?;
        let (header, tx, index) =
            self.node.canonical_transaction(hash).map_err(into_rpc_err)?;
        if header.block_number == 0 {
            return Err(into_rpc_err(RpcError::NotFound(
                "no traceable transactions in the genesis block".to_string(),
            )));
        }

        let parent = self
            .node
            .db
            .canonical_header(header.block_number - 1)
            .map_err(into_rpc_err)?
            .ok_or_else(|| {
                into_rpc_err(RpcError::NotFound(format!(
                    "parent of block {} not found",
                    header.block_number
                )))
            })?;
        let (transactions, _) = self.node.block_body(header.hash()).map_err(into_rpc_err)?;

        // Re-execute the enclosing block in a costless state rooted at the parent.
        let computations = replay_block(&self.node.db, &parent, &header, &transactions)
            .map_err(into_rpc_err)?;
        let computation = computations.get(index as usize).ok_or_else(|| {
            into_rpc_err(RpcError::Internal("trace index out of range".to_string()))
        })?;

        let mut traces = Vec::new();
        trace_computation(computation, &parent, &tx, index, Vec::new(), &mut traces);
        Ok(traces)
    }
}
