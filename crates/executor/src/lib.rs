#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod block;
pub use block::{BlockDescriptor, BlockExecutor};

mod call;
pub use call::{execute_call, replay_block, CallRequest};

mod chaindb;
pub use chaindb::{ChainDb, TransactionLocation};

mod execute;
pub use execute::{execute_transaction, TxError, TxOutcome, TxValidationError};

mod genesis;
pub use genesis::initialize_chain;

mod validation;
pub use validation::validate_block;

mod errors;
pub use errors::{ChainDbError, ExecutorError, ExecutorResult, ValidationError};

#[cfg(test)]
mod tests;
