//! Arithmetic opcodes.

use crate::{
    errors::EvmResult,
    evm::{Control, Evm, Frame},
    gas::costs,
};
use alloy_primitives::{I256, U256};
use veda_state::StateProvider;

pub(super) fn add<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push(a.wrapping_add(b))?;
    Ok(Control::Continue)
}

pub(super) fn mul<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push(a.wrapping_mul(b))?;
    Ok(Control::Continue)
}

pub(super) fn sub<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push(a.wrapping_sub(b))?;
    Ok(Control::Continue)
}

pub(super) fn div<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push(if b.is_zero() { U256::ZERO } else { a / b })?;
    Ok(Control::Continue)
}

pub(super) fn sdiv<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    let result = if b.is_zero() {
        U256::ZERO
    } else {
        I256::from_raw(a).wrapping_div(I256::from_raw(b)).into_raw()
    };
    frame.stack.push(result)?;
    Ok(Control::Continue)
}

pub(super) fn mod_<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push(if b.is_zero() { U256::ZERO } else { a % b })?;
    Ok(Control::Continue)
}

pub(super) fn smod<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b) = (frame.stack.pop()?, frame.stack.pop()?);
    let result = if b.is_zero() {
        U256::ZERO
    } else {
        I256::from_raw(a).wrapping_rem(I256::from_raw(b)).into_raw()
    };
    frame.stack.push(result)?;
    Ok(Control::Continue)
}

pub(super) fn addmod<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b, n) = (frame.stack.pop()?, frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push(if n.is_zero() { U256::ZERO } else { a.add_mod(b, n) })?;
    Ok(Control::Continue)
}

pub(super) fn mulmod<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (a, b, n) = (frame.stack.pop()?, frame.stack.pop()?, frame.stack.pop()?);
    frame.stack.push(if n.is_zero() { U256::ZERO } else { a.mul_mod(b, n) })?;
    Ok(Control::Continue)
}

pub(super) fn exp<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (base, exponent) = (frame.stack.pop()?, frame.stack.pop()?);

    let exponent_bytes = (exponent.bit_len() as u64).div_ceil(8);
    frame.gas.consume_gas(costs::EXP_BYTE * exponent_bytes, "EXP")?;

    frame.stack.push(base.pow(exponent))?;
    Ok(Control::Continue)
}

pub(super) fn signextend<P: StateProvider>(
    _: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    let (position, value) = (frame.stack.pop()?, frame.stack.pop()?);

    let result = if position < U256::from(31) {
        let position = position.to::<usize>();
        let bit_index = position * 8 + 7;
        if value.bit(bit_index) {
            value | (U256::MAX << (bit_index + 1))
        } else {
            value & ((U256::from(1) << (bit_index + 1)) - U256::from(1))
        }
    } else {
        value
    };
    frame.stack.push(result)?;
    Ok(Control::Continue)
}
