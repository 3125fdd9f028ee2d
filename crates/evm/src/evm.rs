//! The interpreter: frame construction, the 256-entry dispatch table, and message
//! application with snapshot semantics.

use crate::{
    analysis::JumpDests,
    computation::Computation,
    env::{BlockEnv, TransactionContext},
    errors::{EvmError, EvmResult, VMError},
    gas::GasMeter,
    logic,
    memory::{words, Memory},
    message::Message,
    precompiles,
    stack::Stack,
};
use alloy_primitives::{Address, Bytes};
use tracing::trace;
use veda_primitives::{
    constants::{
        EIP170_CODE_SIZE_LIMIT, GAS_CODEDEPOSIT, INITCODE_WORD_COST, MAX_INITCODE_SIZE,
        STACK_DEPTH_LIMIT,
    },
    Log,
};
use veda_state::{State, StateProvider};

/// What an opcode handler tells the run loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    /// Advance to the next instruction.
    Continue,
    /// Halt successfully with no output.
    Stop,
    /// Halt successfully; the handler has set the frame's output.
    Return,
    /// Halt reverting; the handler has set the frame's output.
    Revert,
}

/// The mutable execution state of one call frame.
#[derive(Debug)]
pub(crate) struct Frame {
    /// The message that entered the frame.
    pub msg: Message,
    /// The operand stack.
    pub stack: Stack,
    /// The frame memory.
    pub memory: Memory,
    /// The gas meter.
    pub gas: GasMeter,
    /// The program counter.
    pub pc: usize,
    /// Valid jump destinations in the frame's code.
    pub jumpdests: JumpDests,
    /// The read-only buffer holding the last child frame's output.
    pub return_data: Bytes,
    /// The frame's own output, set by RETURN and REVERT.
    pub output: Bytes,
    /// Logs emitted by this frame and merged from successful children.
    pub logs: Vec<Log>,
    /// Accounts scheduled for end-of-transaction deletion.
    pub accounts_to_delete: Vec<Address>,
    /// Sealed child computations, in call order.
    pub children: Vec<Computation>,
    /// The frame's call depth.
    pub depth: usize,
}

impl Frame {
    fn new(msg: Message, depth: usize) -> Self {
        let jumpdests = JumpDests::analyze(&msg.code);
        let gas = GasMeter::new(msg.gas);
        Self {
            msg,
            stack: Stack::new(),
            memory: Memory::new(),
            gas,
            pc: 0,
            jumpdests,
            return_data: Bytes::new(),
            output: Bytes::new(),
            logs: Vec::new(),
            accounts_to_delete: Vec::new(),
            children: Vec::new(),
            depth,
        }
    }

    /// The opcode byte the currently-executing handler was dispatched for.
    pub fn current_opcode(&self) -> u8 {
        self.msg.code[self.pc - 1]
    }
}

/// An opcode handler.
pub(crate) type OpFn<P> = fn(&mut Evm<'_, P>, &mut Frame) -> EvmResult<Control>;

/// One entry of the dispatch table: a mnemonic, the constant gas charged before dispatch,
/// and the handler. Dynamic costs are charged inside the handler.
pub(crate) struct Instruction<P: StateProvider> {
    pub(crate) name: &'static str,
    pub(crate) gas: u64,
    pub(crate) execute: OpFn<P>,
}

impl<P: StateProvider> Clone for Instruction<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: StateProvider> Copy for Instruction<P> {}

impl<P: StateProvider> core::fmt::Debug for Instruction<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Instruction").field("name", &self.name).field("gas", &self.gas).finish()
    }
}

/// The virtual machine: opcode dispatch over the world [State] within one transaction.
#[derive(Debug)]
pub struct Evm<'a, P: StateProvider> {
    /// The world state the transaction executes against.
    pub state: &'a mut State<P>,
    /// The block environment.
    pub block: &'a BlockEnv,
    /// The transaction context.
    pub ctx: TransactionContext,
    table: Box<[Instruction<P>; 256]>,
}

impl<'a, P: StateProvider> Evm<'a, P> {
    /// Creates a VM over `state` for one transaction.
    pub fn new(state: &'a mut State<P>, block: &'a BlockEnv, ctx: TransactionContext) -> Self {
        Self { state, block, ctx, table: logic::dispatch_table() }
    }

    /// Applies a call message, producing a sealed [Computation].
    ///
    /// Takes a snapshot around the frame: an erroring frame observes no persisted state
    /// change. A depth-limit breach surfaces as an error in the *calling* frame.
    pub fn apply_message(&mut self, msg: Message, depth: usize) -> EvmResult<Computation> {
        if depth > STACK_DEPTH_LIMIT {
            return Err(EvmError::Vm(VMError::StackDepthLimit));
        }

        let snapshot = self.state.snapshot();
        self.state.touch_account(msg.storage_address);

        let computation = self.apply_computation(msg, depth)?;

        if computation.is_error() {
            self.state.revert(snapshot).map_err(EvmError::State)?;
        } else {
            self.state.commit(snapshot).map_err(EvmError::State)?;
        }
        Ok(computation)
    }

    /// Applies a creation message: bumps the new contract's nonce (EIP-161), charges the
    /// initcode cost, runs the initcode, and deposits the returned code.
    pub fn apply_create_message(&mut self, msg: Message, depth: usize) -> EvmResult<Computation> {
        if depth > STACK_DEPTH_LIMIT {
            return Err(EvmError::Vm(VMError::StackDepthLimit));
        }

        let snapshot = self.state.snapshot();
        self.state.increment_nonce(msg.storage_address).map_err(EvmError::State)?;

        if msg.code.len() > MAX_INITCODE_SIZE {
            self.state.revert(snapshot).map_err(EvmError::State)?;
            return Err(EvmError::Vm(VMError::OutOfGas("initcode size limit")));
        }

        let mut computation = self.apply_message(msg, depth)?;

        if computation.is_error() {
            self.state.revert(snapshot).map_err(EvmError::State)?;
            return Ok(computation);
        }

        let contract_code = computation.output.clone();
        if !contract_code.is_empty() {
            match Self::deposit_code(&mut computation, &contract_code) {
                Ok(()) => {
                    self.state
                        .set_code(computation.storage_address, contract_code)
                        .map_err(EvmError::State)?;
                }
                Err(err) => {
                    // Unlike a plain message, a creation reverts entirely when the code
                    // write cannot be paid for.
                    trace!(target: "evm", %err, "Failed to deposit contract code");
                    computation.error = Some(err);
                    computation.gas_remaining = 0;
                    self.state.revert(snapshot).map_err(EvmError::State)?;
                    return Ok(computation);
                }
            }
        }
        self.state.commit(snapshot).map_err(EvmError::State)?;
        Ok(computation)
    }

    fn deposit_code(computation: &mut Computation, code: &[u8]) -> Result<(), VMError> {
        if code.len() > EIP170_CODE_SIZE_LIMIT {
            return Err(VMError::OutOfGas("code size limit"));
        }
        if code.first() == Some(&0xef) {
            return Err(VMError::ReservedBytesInCode);
        }
        let deposit_cost = code.len() as u64 * GAS_CODEDEPOSIT;
        if deposit_cost > computation.gas_remaining {
            return Err(VMError::OutOfGas("code deposit"));
        }
        computation.gas_remaining -= deposit_cost;
        Ok(())
    }

    /// Runs the frame for `msg`, catching in-computation errors into the sealed result.
    fn apply_computation(&mut self, msg: Message, depth: usize) -> EvmResult<Computation> {
        let mut computation = Computation::new(
            msg.call_type,
            msg.sender,
            msg.code_address,
            msg.storage_address,
            if msg.is_create() { msg.code.clone() } else { msg.data.clone() },
            msg.gas,
        );

        // Precompiles bypass the interpreter; the forwarded gas must cover the fee.
        if !msg.is_create() && precompiles::is_precompile(msg.code_address) {
            match precompiles::run_precompile(msg.code_address, &msg.data, msg.gas) {
                Ok((output, gas_used)) => {
                    computation.output = output;
                    computation.gas_remaining = msg.gas - gas_used;
                }
                Err(err) => {
                    computation.error = Some(err);
                    computation.gas_remaining = 0;
                }
            }
            return Ok(computation);
        }

        let mut frame = Frame::new(msg, depth);

        // EIP-3860: initcode is paid for by the creation frame before it runs.
        if frame.msg.is_create() {
            let initcode_cost = INITCODE_WORD_COST * words(frame.msg.code.len()) as u64;
            if let Err(err) = frame.gas.consume_gas(initcode_cost, "initcode") {
                computation.error = Some(err);
                computation.gas_remaining = 0;
                return Ok(computation);
            }
        }

        let error = self.run_frame(&mut frame)?;
        Ok(Self::seal(computation, frame, error))
    }

    fn seal(mut computation: Computation, frame: Frame, error: Option<VMError>) -> Computation {
        computation.output = frame.output;
        computation.logs = frame.logs;
        computation.accounts_to_delete = frame.accounts_to_delete;
        computation.children = frame.children;
        computation.set_refund(frame.gas.gas_refunded());
        computation.gas_remaining = match &error {
            Some(err) if err.burns_gas() => 0,
            _ => frame.gas.gas_remaining(),
        };
        computation.error = error;
        computation
    }

    /// The dispatch loop. Returns the in-computation error the frame halted with, if any;
    /// database faults propagate.
    fn run_frame(&mut self, frame: &mut Frame) -> EvmResult<Option<VMError>> {
        loop {
            if frame.pc >= frame.msg.code.len() {
                return Ok(None);
            }
            let opcode = frame.msg.code[frame.pc];
            frame.pc += 1;

            let instruction = self.table[opcode as usize];
            if let Err(err) = frame.gas.consume_gas(instruction.gas, instruction.name) {
                return Ok(Some(err));
            }

            match (instruction.execute)(self, frame) {
                Ok(Control::Continue) => {}
                Ok(Control::Stop) | Ok(Control::Return) => return Ok(None),
                Ok(Control::Revert) => return Ok(Some(VMError::Revert)),
                Err(EvmError::Vm(err)) => return Ok(Some(err)),
                Err(EvmError::State(err)) => return Err(EvmError::State(err)),
            }
        }
    }
}
