#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::RpcError;

mod events;
pub use events::{ChainEvent, EventBus};

mod gate;
pub use gate::ImportGate;

mod node;
pub use node::{Node, NodeHandle, DEFAULT_GAS_PRICE};

pub mod types;

mod eth;
pub use eth::{EthApiServer, EthRpc};

mod net;
pub use net::{NetApiServer, NetRpc};

mod sync;
pub use sync::{SyncApiServer, SyncRpc};

mod trace;
pub use trace::{TraceApiServer, TraceRpc};

mod txpool;
pub use txpool::{TxPoolApiServer, TxPoolRpc};

mod veda;
pub use veda::{VedaApiServer, VedaRpc};

mod server;
pub use server::{start_read_server, start_sync_server, ApiSet};

#[cfg(test)]
mod tests;
