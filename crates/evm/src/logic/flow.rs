//! Control-flow and halting opcodes.

use super::charge_memory;
use crate::{
    errors::{EvmError, EvmResult, VMError},
    evm::{Control, Evm, Frame},
};
use alloy_primitives::{Bytes, U256};
use veda_state::StateProvider;

pub(super) fn stop<P: StateProvider>(_: &mut Evm<'_, P>, _: &mut Frame) -> EvmResult<Control> {
    Ok(Control::Stop)
}

pub(super) fn jump<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let target = frame.stack.pop()?;
    if !frame.jumpdests.is_valid(target) {
        return Err(EvmError::Vm(VMError::InvalidJumpDestination));
    }
    frame.pc = target.to::<usize>();
    Ok(Control::Continue)
}

pub(super) fn jumpi<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (target, condition) = (frame.stack.pop()?, frame.stack.pop()?);
    if !condition.is_zero() {
        if !frame.jumpdests.is_valid(target) {
            return Err(EvmError::Vm(VMError::InvalidJumpDestination));
        }
        frame.pc = target.to::<usize>();
    }
    Ok(Control::Continue)
}

pub(super) fn pc<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(U256::from(frame.pc - 1))?;
    Ok(Control::Continue)
}

pub(super) fn gas<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(U256::from(frame.gas.gas_remaining()))?;
    Ok(Control::Continue)
}

pub(super) fn jumpdest<P: StateProvider>(_: &mut Evm<'_, P>, _: &mut Frame) -> EvmResult<Control> {
    Ok(Control::Continue)
}

pub(super) fn return_op<P: StateProvider>(
    _: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    let (offset, size) = (frame.stack.pop_usize()?, frame.stack.pop_usize()?);
    charge_memory(frame, offset, size)?;
    frame.output = Bytes::copy_from_slice(frame.memory.read(offset, size));
    Ok(Control::Return)
}

pub(super) fn revert<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (offset, size) = (frame.stack.pop_usize()?, frame.stack.pop_usize()?);
    charge_memory(frame, offset, size)?;
    frame.output = Bytes::copy_from_slice(frame.memory.read(offset, size));
    Ok(Control::Revert)
}
