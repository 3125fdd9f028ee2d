//! Costless read-only execution: `eth_call`, `eth_estimateGas`, and block replay for
//! traces.

use crate::{
    chaindb::ChainDb,
    errors::{ExecutorError, ExecutorResult},
    execute::{execute_transaction, TxError},
};
use alloy_primitives::{Address, Bytes, U256};
use veda_evm::{BlockEnv, CallType, Computation, Evm, Message, TransactionContext};
use veda_primitives::{constants::VEDA_CHAIN_ID, SealedHeader, Transaction};
use veda_state::State;

/// A read-only call request, as shaped by `eth_call` and `eth_estimateGas`.
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    /// The caller. Defaults to the zero address.
    pub sender: Address,
    /// The call target, or `None` to execute `data` as initcode.
    pub to: Option<Address>,
    /// The call data.
    pub data: Bytes,
    /// The gas budget. Defaults to the block gas limit.
    pub gas: Option<u64>,
}

fn env_for(db: &ChainDb, header: &SealedHeader) -> ExecutorResult<BlockEnv> {
    let mut block_hashes = vec![header.parent_hash];
    block_hashes.extend(db.ancestor_hashes(header, 255)?);
    Ok(BlockEnv {
        number: header.block_number,
        timestamp: header.timestamp,
        gas_limit: header.gas_limit,
        coinbase: header.coinbase,
        mix_hash: header.mix_hash,
        chain_id: VEDA_CHAIN_ID,
        block_hashes,
    })
}

/// Executes `request` against the state at `header`, observing but never persisting state.
pub fn execute_call(
    db: &ChainDb,
    header: &SealedHeader,
    request: &CallRequest,
) -> ExecutorResult<Computation> {
    let mut state = State::new(header.state_root, db.clone());
    let env = env_for(db, header)?;
    let gas = request.gas.unwrap_or(header.gas_limit);

    let msg = match request.to {
        Some(to) => Message {
            call_type: CallType::Call,
            gas,
            storage_address: to,
            code_address: to,
            sender: request.sender,
            value: U256::ZERO,
            data: request.data.clone(),
            code: state.get_code(to)?,
            is_static: false,
        },
        None => {
            let contract = veda_primitives::generate_contract_address(
                request.sender,
                state.get_nonce(request.sender)?,
            );
            Message {
                call_type: CallType::Create,
                gas,
                storage_address: contract,
                code_address: contract,
                sender: request.sender,
                value: U256::ZERO,
                data: Bytes::new(),
                code: request.data.clone(),
                is_static: false,
            }
        }
    };

    state.mark_address_warm(request.sender);
    state.mark_address_warm(msg.storage_address);

    let mut evm = Evm::new(&mut state, &env, TransactionContext::new(request.sender));
    match crate::execute::run_computation(&mut evm, msg) {
        Ok(computation) => Ok(computation),
        Err(TxError::State(err)) => Err(ExecutorError::State(err)),
        Err(TxError::Validation(err)) => Err(ExecutorError::State(
            veda_state::StateError::Provider(err.to_string()),
        )),
    }
}

/// Re-executes a canonical block's transactions in a costless state rooted at the parent,
/// returning the computation tree of each transaction. Backs `trace_transaction`.
pub fn replay_block(
    db: &ChainDb,
    parent: &SealedHeader,
    header: &SealedHeader,
    transactions: &[Transaction],
) -> ExecutorResult<Vec<Computation>> {
    let mut state = State::new(parent.state_root, db.clone());
    let env = BlockEnv {
        number: header.block_number,
        timestamp: header.timestamp,
        gas_limit: header.gas_limit,
        coinbase: header.coinbase,
        mix_hash: header.mix_hash,
        chain_id: VEDA_CHAIN_ID,
        block_hashes: {
            let mut hashes = vec![parent.hash()];
            hashes.extend(db.ancestor_hashes(parent, 255)?);
            hashes
        },
    };

    let mut computations = Vec::with_capacity(transactions.len());
    let mut cumulative = 0u64;
    for tx in transactions {
        match execute_transaction(&mut state, &env, tx, cumulative) {
            Ok(outcome) => {
                cumulative += outcome.gas_used;
                computations.push(outcome.computation);
            }
            // Canonical transactions validated when the block was applied; a drop here
            // would mean the replay state diverged.
            Err(TxError::Validation(err)) => {
                return Err(ExecutorError::State(veda_state::StateError::Provider(
                    err.to_string(),
                )))
            }
            Err(TxError::State(err)) => return Err(ExecutorError::State(err)),
        }
    }
    Ok(computations)
}
