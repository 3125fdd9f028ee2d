//! The result of one call frame, including its nested children.

use crate::{errors::VMError, message::CallType};
use alloy_primitives::{Address, Bytes};
use veda_primitives::Log;

/// The sealed outcome of a call frame.
///
/// Frames form a tree whose lifetime ends with the transaction: each computation owns its
/// children, bounded in practice by the 1024 depth limit. Logs and self-destruct marks of
/// successful children are merged into the parent in program order; erroring children keep
/// theirs for inspection but contribute nothing upward.
#[derive(Debug, Clone)]
pub struct Computation {
    /// How the frame was entered.
    pub call_type: CallType,
    /// The caller as the frame saw it.
    pub sender: Address,
    /// The account whose code ran.
    pub code_address: Address,
    /// The account whose storage the frame addressed; for creations, the new contract.
    pub storage_address: Address,
    /// The call data, or the initcode for creation frames.
    pub input: Bytes,
    /// The gas forwarded to the frame.
    pub gas: u64,
    /// The frame's output: RETURN/REVERT data, or the deployed code for creations.
    pub output: Bytes,
    /// The error the frame halted with, if any.
    pub error: Option<VMError>,
    /// Logs emitted by this frame and its successful children, in program order.
    pub logs: Vec<Log>,
    /// Accounts scheduled for deletion by this frame and its successful children.
    pub accounts_to_delete: Vec<Address>,
    /// Child frames, in call order.
    pub children: Vec<Computation>,
    /// Gas left in the frame after settling: zero when the error burns gas.
    pub gas_remaining: u64,
    /// The net refund counter of this frame and its successful children.
    gas_refunded: i64,
}

impl Computation {
    /// Creates an empty computation shell for a frame entered with the given parameters.
    pub fn new(
        call_type: CallType,
        sender: Address,
        code_address: Address,
        storage_address: Address,
        input: Bytes,
        gas: u64,
    ) -> Self {
        Self {
            call_type,
            sender,
            code_address,
            storage_address,
            input,
            gas,
            output: Bytes::new(),
            error: None,
            logs: Vec::new(),
            accounts_to_delete: Vec::new(),
            children: Vec::new(),
            gas_remaining: 0,
            gas_refunded: 0,
        }
    }

    pub(crate) fn set_refund(&mut self, refund: i64) {
        self.gas_refunded = refund;
    }

    /// Returns `true` if the frame halted with an error (including REVERT).
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns `true` if the frame completed without error.
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The gas the frame consumed, after returning unused gas.
    pub const fn gas_used(&self) -> u64 {
        self.gas - self.gas_remaining
    }

    /// The net refund the frame contributes to the transaction. Erroring frames, REVERT
    /// included, forfeit their refunds.
    pub const fn gas_refund(&self) -> i64 {
        if self.error.is_some() {
            0
        } else {
            self.gas_refunded
        }
    }

    /// Returns `true` if the frame created a contract.
    pub const fn is_create(&self) -> bool {
        self.call_type.is_create()
    }
}
