//! Comparison and bitwise opcodes.

use crate::{
    errors::EvmResult,
    evm::{Control, Evm, Frame},
};
use alloy_primitives::{I256, U256};
use veda_state::StateProvider;

pub(super) fn lt<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push_bool(a < b)?;
    Ok(Control::Continue)
}

pub(super) fn gt<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push_bool(a > b)?;
    Ok(Control::Continue)
}

pub(super) fn slt<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push_bool(I256::from_raw(a) < I256::from_raw(b))?;
    Ok(Control::Continue)
}

pub(super) fn sgt<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push_bool(I256::from_raw(a) > I256::from_raw(b))?;
    Ok(Control::Continue)
}

pub(super) fn eq<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push_bool(a == b)?;
    Ok(Control::Continue)
}

pub(super) fn iszero<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let a = frame.stack.pop()?;
    frame.stack.push_bool(a.is_zero())?;
    Ok(Control::Continue)
}

pub(super) fn and<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push(a & b)?;
    Ok(Control::Continue)
}

pub(super) fn or<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push(a | b)?;
    Ok(Control::Continue)
}

pub(super) fn xor<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push(a ^ b)?;
    Ok(Control::Continue)
}

pub(super) fn not<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let a = frame.stack.pop()?;
    frame.stack.push(!a)?;
    Ok(Control::Continue)
}

pub(super) fn byte<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (position, value) = (frame.stack.pop()?, frame.stack.pop()?);
    let result = if position < U256::from(32) {
        U256::from(value.to_be_bytes::<32>()[position.to::<usize>()])
    } else {
        U256::ZERO
    };
    frame.stack.push(result)?;
    Ok(Control::Continue)
}

pub(super) fn shl<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (shift, value) = (frame.stack.pop()?, frame.stack.pop()?);
    let result =
        if shift < U256::from(256) { value << shift.to::<usize>() } else { U256::ZERO };
    frame.stack.push(result)?;
    Ok(Control::Continue)
}

pub(super) fn shr<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (shift, value) = (frame.stack.pop()?, frame.stack.pop()?);
    let result =
        if shift < U256::from(256) { value >> shift.to::<usize>() } else { U256::ZERO };
    frame.stack.push(result)?;
    Ok(Control::Continue)
}

pub(super) fn sar<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (shift, value) = (frame.stack.pop()?, frame.stack.pop()?);
    let signed = I256::from_raw(value);
    let result = if shift < U256::from(256) {
        signed.asr(shift.to::<usize>()).into_raw()
    } else if signed.is_negative() {
        U256::MAX
    } else {
        U256::ZERO
    };
    frame.stack.push(result)?;
    Ok(Control::Continue)
}
