//! Per-transaction execution: validation, message construction, refund settlement, and
//! receipt assembly.

use alloy_primitives::{keccak256, Bytes, U256};
use tracing::debug;
use veda_evm::{BlockEnv, CallType, Computation, Evm, EvmError, Message, TransactionContext, VMError};
use veda_primitives::{
    constants::{MAX_REFUND_QUOTIENT, REFUND_SELFDESTRUCT},
    generate_contract_address, Receipt, Transaction,
};
use veda_state::{State, StateError, StateProvider};

/// Why a transaction was dropped from the block instead of executing.
///
/// Dropped transactions are logged and omitted; the block continues without them.
#[derive(Debug, derive_more::Display, Clone, PartialEq, Eq)]
pub enum TxValidationError {
    /// The declared nonce does not match the sender's account nonce.
    #[display("Invalid transaction nonce: expected {expected}, but got {got}")]
    NonceMismatch {
        /// The sender's account nonce.
        expected: u64,
        /// The nonce the transaction declared.
        got: u64,
    },
    /// The gas limit does not cover the intrinsic cost.
    #[display("Insufficient gas: intrinsic cost {intrinsic} exceeds limit {limit}")]
    InsufficientGas {
        /// The intrinsic cost of the transaction.
        intrinsic: u64,
        /// The transaction's gas limit.
        limit: u64,
    },
}

impl core::error::Error for TxValidationError {}

/// The error channel of transaction application: a validation error drops the transaction,
/// a state error aborts the block.
#[derive(Debug, derive_more::Display, Clone, PartialEq, Eq)]
pub enum TxError {
    /// The transaction failed validation and is dropped from the block.
    #[display("{_0}")]
    Validation(TxValidationError),
    /// The state layer failed; fatal for the block.
    #[display("{_0}")]
    State(StateError),
}

impl core::error::Error for TxError {}

impl From<TxValidationError> for TxError {
    fn from(err: TxValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<StateError> for TxError {
    fn from(err: StateError) -> Self {
        Self::State(err)
    }
}

/// The result of applying one transaction.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    /// The sealed computation tree.
    pub computation: Computation,
    /// The receipt, carrying the cumulative gas through this transaction.
    pub receipt: Receipt,
    /// The gas this transaction consumed, net of the capped refund.
    pub gas_used: u64,
}

/// Applies `tx` to `state`, producing a receipt whose cumulative gas extends
/// `prior_cumulative_gas`.
///
/// The sender's nonce is bumped before execution and survives any revert. A computation
/// error still yields a (failure) receipt; only a validation error drops the transaction.
pub fn execute_transaction<P: StateProvider>(
    state: &mut State<P>,
    block: &BlockEnv,
    tx: &Transaction,
    prior_cumulative_gas: u64,
) -> Result<TxOutcome, TxError> {
    state.reset_transaction();

    // (a) Validate.
    let intrinsic = tx.intrinsic_gas();
    if tx.gas < intrinsic {
        return Err(TxValidationError::InsufficientGas { intrinsic, limit: tx.gas }.into());
    }
    let sender_nonce = state.get_nonce(tx.veda_sender)?;
    if sender_nonce != tx.nonce {
        return Err(
            TxValidationError::NonceMismatch { expected: sender_nonce, got: tx.nonce }.into()
        );
    }

    // (b) The nonce bump is outside any snapshot: it survives a reverting computation.
    state.increment_nonce(tx.veda_sender)?;

    // (c) Build the message.
    let message_gas = tx.gas - intrinsic;
    let msg = match tx.to {
        Some(to) => {
            let code = state.get_code(to)?;
            Message {
                call_type: CallType::Call,
                gas: message_gas,
                storage_address: to,
                code_address: to,
                sender: tx.veda_sender,
                value: U256::ZERO,
                data: tx.data.clone(),
                code,
                is_static: false,
            }
        }
        None => {
            let contract_address = generate_contract_address(tx.veda_sender, tx.nonce);
            Message {
                call_type: CallType::Create,
                gas: message_gas,
                storage_address: contract_address,
                code_address: contract_address,
                sender: tx.veda_sender,
                value: U256::ZERO,
                data: Bytes::new(),
                code: tx.data.clone(),
                is_static: false,
            }
        }
    };

    debug!(
        target: "executor",
        sender = %tx.veda_sender,
        to = ?tx.to,
        gas = tx.gas,
        data_hash = %keccak256(&tx.data),
        "TRANSACTION",
    );

    // (d) Pre-warm the sender and the target before the outer frame starts.
    state.mark_address_warm(tx.veda_sender);
    state.mark_address_warm(msg.storage_address);

    // (e) Run.
    let mut evm = Evm::new(state, block, TransactionContext::new(tx.veda_sender));
    let computation = if msg.is_create() {
        if evm.state.has_code_or_nonce(msg.storage_address)? {
            debug!(
                target: "executor",
                address = %msg.storage_address,
                "Address collision while creating contract",
            );
            collision_computation(msg)
        } else {
            run_computation(&mut evm, msg)?
        }
    } else {
        run_computation(&mut evm, msg)?
    };

    // (f) Settle the refund, capped at half the gas consumed.
    let mut refund = 0u64;
    if computation.is_success() {
        let gross = computation.gas_refund() +
            (REFUND_SELFDESTRUCT * computation.accounts_to_delete.len() as u64) as i64;
        let gas_used = tx.gas - computation.gas_remaining;
        refund = (gross.max(0) as u64).min(gas_used / MAX_REFUND_QUOTIENT);
    }

    // (g) Process self-destructs, then EIP-161 empty-touched cleanup.
    if computation.is_success() {
        for address in &computation.accounts_to_delete {
            debug!(target: "executor", %address, "DELETING ACCOUNT");
            state.delete_account(*address)?;
        }
    }
    for address in state.touched_accounts() {
        if state.account_exists(address)? && state.account_is_empty(address)? {
            debug!(target: "executor", %address, "CLEARING EMPTY ACCOUNT");
            state.delete_account(address)?;
        }
    }

    // (h) Build the receipt.
    let gas_used = tx.gas - computation.gas_remaining - refund;
    let logs = if computation.is_success() { computation.logs.clone() } else { Vec::new() };
    let receipt = Receipt::new(
        computation.is_success(),
        prior_cumulative_gas + gas_used,
        logs,
    );

    Ok(TxOutcome { computation, receipt, gas_used })
}

pub(crate) fn run_computation<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    msg: Message,
) -> Result<Computation, TxError> {
    let is_create = msg.is_create();
    let result = if is_create {
        evm.apply_create_message(msg.clone(), 0)
    } else {
        evm.apply_message(msg.clone(), 0)
    };
    match result {
        Ok(computation) => Ok(computation),
        // A depth-style error cannot occur at depth zero, but any stray computation error
        // still settles as a failed transaction rather than a dropped one.
        Err(EvmError::Vm(err)) => Ok(errored_computation(msg, err)),
        Err(EvmError::State(err)) => Err(TxError::State(err)),
    }
}

fn collision_computation(msg: Message) -> Computation {
    errored_computation(msg, VMError::ContractCreationCollision)
}

fn errored_computation(msg: Message, error: VMError) -> Computation {
    let mut computation = Computation::new(
        msg.call_type,
        msg.sender,
        msg.code_address,
        msg.storage_address,
        if msg.is_create() { msg.code } else { msg.data },
        msg.gas,
    );
    computation.error = Some(error);
    computation
}
