#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod analysis;
pub use analysis::JumpDests;

mod computation;
pub use computation::Computation;

mod env;
pub use env::{BlockEnv, TransactionContext};

mod errors;
pub use errors::{EvmError, EvmResult, VMError};

mod evm;
pub use evm::Evm;

mod gas;
pub use gas::{memory_cost, GasMeter};

mod logic;

mod memory;
pub use memory::Memory;

mod message;
pub use message::{CallType, Message};

mod precompiles;
pub use precompiles::{is_precompile, run_precompile};

mod stack;
pub use stack::Stack;

#[cfg(test)]
mod tests;
