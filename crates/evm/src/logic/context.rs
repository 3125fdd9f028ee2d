//! Environmental and block-context opcodes.

use super::{charge_memory, consume_account_load};
use crate::{
    errors::{EvmError, EvmResult, VMError},
    evm::{Control, Evm, Frame},
    gas::costs,
    memory::words,
};
use alloy_primitives::{keccak256 as keccak, U256};
use veda_state::StateProvider;

pub(super) fn keccak256<P: StateProvider>(
    _: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    let (offset, size) = (frame.stack.pop_usize()?, frame.stack.pop_usize()?);
    frame.gas.consume_gas(costs::KECCAK256_WORD * words(size) as u64, "KECCAK256")?;
    charge_memory(frame, offset, size)?;

    let hash = keccak(frame.memory.read(offset, size));
    frame.stack.push_b256(hash)?;
    Ok(Control::Continue)
}

pub(super) fn address<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push_address(frame.msg.storage_address)?;
    Ok(Control::Continue)
}

pub(super) fn balance<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let address = frame.stack.pop_address()?;
    consume_account_load(evm, frame, address, "BALANCE")?;
    let balance = evm.state.get_balance(address).map_err(EvmError::State)?;
    frame.stack.push(balance)?;
    Ok(Control::Continue)
}

pub(super) fn origin<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push_address(evm.ctx.origin)?;
    Ok(Control::Continue)
}

pub(super) fn caller<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push_address(frame.msg.sender)?;
    Ok(Control::Continue)
}

pub(super) fn callvalue<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(frame.msg.value)?;
    Ok(Control::Continue)
}

pub(super) fn calldataload<P: StateProvider>(
    _: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    let offset = frame.stack.pop_usize()?;
    let mut word = [0u8; 32];
    if offset < frame.msg.data.len() {
        let available = (frame.msg.data.len() - offset).min(32);
        word[..available].copy_from_slice(&frame.msg.data[offset..offset + available]);
    }
    frame.stack.push(U256::from_be_bytes(word))?;
    Ok(Control::Continue)
}

pub(super) fn calldatasize<P: StateProvider>(
    _: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    frame.stack.push(U256::from(frame.msg.data.len()))?;
    Ok(Control::Continue)
}

fn copy_into_memory(
    frame: &mut Frame,
    dest_offset: usize,
    src_offset: usize,
    size: usize,
    source: &[u8],
    reason: &'static str,
) -> EvmResult<()> {
    frame.gas.consume_gas(costs::COPY_WORD * words(size) as u64, reason)?;
    charge_memory(frame, dest_offset, size)?;
    if size == 0 {
        return Ok(());
    }
    let slice = if src_offset < source.len() { &source[src_offset..] } else { &[] };
    frame.memory.write_padded(dest_offset, size, slice);
    Ok(())
}

pub(super) fn calldatacopy<P: StateProvider>(
    _: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    let (dest, src, size) =
        (frame.stack.pop_usize()?, frame.stack.pop_usize()?, frame.stack.pop_usize()?);
    let data = frame.msg.data.clone();
    copy_into_memory(frame, dest, src, size, &data, "CALLDATACOPY")?;
    Ok(Control::Continue)
}

pub(super) fn codesize<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(U256::from(frame.msg.code.len()))?;
    Ok(Control::Continue)
}

pub(super) fn codecopy<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let (dest, src, size) =
        (frame.stack.pop_usize()?, frame.stack.pop_usize()?, frame.stack.pop_usize()?);
    let code = frame.msg.code.clone();
    copy_into_memory(frame, dest, src, size, &code, "CODECOPY")?;
    Ok(Control::Continue)
}

pub(super) fn gasprice<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(evm.ctx.gas_price)?;
    Ok(Control::Continue)
}

pub(super) fn extcodesize<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    let address = frame.stack.pop_address()?;
    consume_account_load(evm, frame, address, "EXTCODESIZE")?;
    let code = evm.state.get_code(address).map_err(EvmError::State)?;
    frame.stack.push(U256::from(code.len()))?;
    Ok(Control::Continue)
}

pub(super) fn extcodecopy<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    let address = frame.stack.pop_address()?;
    let (dest, src, size) =
        (frame.stack.pop_usize()?, frame.stack.pop_usize()?, frame.stack.pop_usize()?);
    consume_account_load(evm, frame, address, "EXTCODECOPY")?;
    let code = evm.state.get_code(address).map_err(EvmError::State)?;
    copy_into_memory(frame, dest, src, size, &code, "EXTCODECOPY")?;
    Ok(Control::Continue)
}

pub(super) fn returndatasize<P: StateProvider>(
    _: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    frame.stack.push(U256::from(frame.return_data.len()))?;
    Ok(Control::Continue)
}

pub(super) fn returndatacopy<P: StateProvider>(
    _: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    let (dest, src, size) =
        (frame.stack.pop_usize()?, frame.stack.pop_usize()?, frame.stack.pop_usize()?);

    // Unlike the other copies, reading past the return data buffer is an error.
    if src.checked_add(size).map_or(true, |end| end > frame.return_data.len()) {
        return Err(EvmError::Vm(VMError::OutOfBoundsRead));
    }
    let data = frame.return_data.clone();
    copy_into_memory(frame, dest, src, size, &data, "RETURNDATACOPY")?;
    Ok(Control::Continue)
}

pub(super) fn extcodehash<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    let address = frame.stack.pop_address()?;
    consume_account_load(evm, frame, address, "EXTCODEHASH")?;
    if evm.state.account_is_empty(address).map_err(EvmError::State)? {
        frame.stack.push(U256::ZERO)?;
    } else {
        let code_hash = evm.state.get_code_hash(address).map_err(EvmError::State)?;
        frame.stack.push_b256(code_hash)?;
    }
    Ok(Control::Continue)
}

pub(super) fn blockhash<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let number = frame.stack.pop()?;
    frame.stack.push_b256(evm.block.ancestor_hash(number))?;
    Ok(Control::Continue)
}

pub(super) fn coinbase<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push_address(evm.block.coinbase)?;
    Ok(Control::Continue)
}

pub(super) fn timestamp<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(U256::from(evm.block.timestamp))?;
    Ok(Control::Continue)
}

pub(super) fn number<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(U256::from(evm.block.number))?;
    Ok(Control::Continue)
}

pub(super) fn prevrandao<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    frame.stack.push_b256(evm.block.mix_hash)?;
    Ok(Control::Continue)
}

pub(super) fn gaslimit<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(U256::from(evm.block.gas_limit))?;
    Ok(Control::Continue)
}

pub(super) fn chainid<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(U256::from(evm.block.chain_id))?;
    Ok(Control::Continue)
}

pub(super) fn selfbalance<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    let balance = evm.state.get_balance(frame.msg.storage_address).map_err(EvmError::State)?;
    frame.stack.push(balance)?;
    Ok(Control::Continue)
}

pub(super) fn basefee<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    frame.stack.push(U256::ZERO)?;
    Ok(Control::Continue)
}
