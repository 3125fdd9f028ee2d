//! The message type carried into each call frame.

use alloy_primitives::{Address, Bytes, U256};

/// How a frame was entered. Determines storage addressing, static-ness, and the wire shape
/// of traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    /// A plain CALL, or the outer frame of a non-creating transaction.
    Call,
    /// CALLCODE: callee code runs against the caller's storage.
    CallCode,
    /// DELEGATECALL: callee code runs with the caller's storage, sender, and value.
    DelegateCall,
    /// STATICCALL: a call with state mutation forbidden.
    StaticCall,
    /// CREATE, or the outer frame of a creating transaction.
    Create,
    /// CREATE2.
    Create2,
}

impl CallType {
    /// Returns `true` for the creating variants.
    pub const fn is_create(&self) -> bool {
        matches!(self, Self::Create | Self::Create2)
    }

    /// The lowercase wire name used in traces.
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::CallCode => "callcode",
            Self::DelegateCall => "delegatecall",
            Self::StaticCall => "staticcall",
            Self::Create | Self::Create2 => "create",
        }
    }
}

/// A message: the input to one call frame.
///
/// `value` is carried for interface compatibility but never moves balances; the executor
/// builds every message with `should_transfer_value = false`.
#[derive(Debug, Clone)]
pub struct Message {
    /// How the frame is entered.
    pub call_type: CallType,
    /// The gas budget forwarded to the frame.
    pub gas: u64,
    /// The account whose storage the frame reads and writes.
    pub storage_address: Address,
    /// The account whose code runs.
    pub code_address: Address,
    /// The caller as seen by the frame.
    pub sender: Address,
    /// The declared value. Never transferred.
    pub value: U256,
    /// The call data, or empty for creation frames.
    pub data: Bytes,
    /// The code to execute: the callee's code, or the initcode for creation frames.
    pub code: Bytes,
    /// Whether state mutation is forbidden in this frame.
    pub is_static: bool,
}

impl Message {
    /// Returns `true` if this message creates a contract.
    pub const fn is_create(&self) -> bool {
        self.call_type.is_create()
    }
}
