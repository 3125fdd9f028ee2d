//! Stack manipulation and memory opcodes.

use super::charge_memory;
use crate::{
    errors::EvmResult,
    evm::{Control, Evm, Frame},
};
use alloy_primitives::U256;
use veda_state::StateProvider;

pub(super) fn pop<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.pop()?;
    Ok(Control::Continue)
}

pub(super) fn push0<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(U256::ZERO)?;
    Ok(Control::Continue)
}

pub(super) fn push<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let width = (frame.current_opcode() - 0x60) as usize + 1;
    let code = &frame.msg.code;

    // Immediates read past the end of code are zero-padded.
    let start = frame.pc.min(code.len());
    let end = (frame.pc + width).min(code.len());
    let mut word = [0u8; 32];
    word[32 - width..32 - width + (end - start)].copy_from_slice(&code[start..end]);

    frame.pc += width;
    frame.stack.push(U256::from_be_bytes(word))?;
    Ok(Control::Continue)
}

pub(super) fn dup<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let position = (frame.current_opcode() - 0x80) as usize + 1;
    frame.stack.dup(position)?;
    Ok(Control::Continue)
}

pub(super) fn swap<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let position = (frame.current_opcode() - 0x90) as usize + 1;
    frame.stack.swap(position)?;
    Ok(Control::Continue)
}

pub(super) fn mload<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let offset = frame.stack.pop_usize()?;
    charge_memory(frame, offset, 32)?;
    let word = frame.memory.read_word(offset);
    frame.stack.push(word)?;
    Ok(Control::Continue)
}

pub(super) fn mstore<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (offset, value) = (frame.stack.pop_usize()?, frame.stack.pop()?);
    charge_memory(frame, offset, 32)?;
    frame.memory.write(offset, &value.to_be_bytes::<32>());
    Ok(Control::Continue)
}

pub(super) fn mstore8<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (offset, value) = (frame.stack.pop_usize()?, frame.stack.pop()?);
    charge_memory(frame, offset, 1)?;
    frame.memory.write(offset, &[value.to_be_bytes::<32>()[31]]);
    Ok(Control::Continue)
}

pub(super) fn msize<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(U256::from(frame.memory.len()))?;
    Ok(Control::Continue)
}
