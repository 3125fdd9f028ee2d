//! Errors for the `veda-evm` crate.

use veda_state::StateError;

/// An error raised by the virtual machine within a computation.
///
/// Every variant here is caught at the frame boundary: the frame's snapshot is reverted and
/// the transaction still produces a failure receipt. Database-level faults are *not* VM
/// errors; they travel as [EvmError::State] and abort the enclosing block application.
#[derive(Debug, derive_more::Display, Clone, PartialEq, Eq)]
pub enum VMError {
    /// The frame ran out of gas.
    #[display("Out of gas: {_0}")]
    OutOfGas(&'static str),
    /// The message-call depth limit of 1024 was exceeded.
    #[display("Stack depth limit reached")]
    StackDepthLimit,
    /// A stack operation underflowed.
    #[display("Insufficient stack items")]
    InsufficientStack,
    /// The stack grew past 1024 words.
    #[display("Stack limit reached")]
    FullStack,
    /// An undefined opcode was executed.
    #[display("Invalid instruction: {_0:#04x}")]
    InvalidInstruction(u8),
    /// A JUMP/JUMPI target was not a JUMPDEST.
    #[display("Invalid jump destination")]
    InvalidJumpDestination,
    /// A state-mutating opcode ran inside a STATICCALL frame.
    #[display("Cannot modify state while inside of a STATICCALL context")]
    WriteProtection,
    /// A value transfer exceeded the sender's balance. Value transfers are neutralized, so
    /// this is unreachable in production; the variant is kept for the wire-visible error set.
    #[display("Insufficient funds")]
    InsufficientFunds,
    /// Deployed code began with the reserved 0xEF byte (EIP-3541).
    #[display("Contract code begins with the reserved 0xEF byte")]
    ReservedBytesInCode,
    /// A RETURNDATACOPY read past the end of the return data buffer.
    #[display("Out-of-bounds read of return data")]
    OutOfBoundsRead,
    /// The create target address already had code or a nonce.
    #[display("Address collision while creating contract")]
    ContractCreationCollision,
    /// The frame executed REVERT. Remaining gas is returned to the caller; refunds are
    /// discarded.
    #[display("Execution reverted")]
    Revert,
}

impl core::error::Error for VMError {}

impl VMError {
    /// Returns `true` if the error consumes all gas remaining in the frame. Only REVERT
    /// returns its unused gas.
    pub const fn burns_gas(&self) -> bool {
        !matches!(self, Self::Revert)
    }
}

/// The error channel of the interpreter: either an in-computation [VMError], which converts
/// into a failure receipt, or a fatal [StateError] (a missing trie node, a missing code
/// blob), which aborts block application.
#[derive(Debug, derive_more::Display, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// An in-computation error.
    #[display("{_0}")]
    Vm(VMError),
    /// A database-level fault.
    #[display("State error: {_0}")]
    State(StateError),
}

impl core::error::Error for EvmError {}

impl From<VMError> for EvmError {
    fn from(err: VMError) -> Self {
        Self::Vm(err)
    }
}

impl From<StateError> for EvmError {
    fn from(err: StateError) -> Self {
        Self::State(err)
    }
}

/// A [Result] type alias for interpreter-internal operations.
pub type EvmResult<T> = Result<T, EvmError>;
