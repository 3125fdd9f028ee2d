//! The message-call family: CALL, CALLCODE, DELEGATECALL, STATICCALL.

use super::{absorb_child, account_load_cost, charge_memory};
use crate::{
    errors::{EvmError, EvmResult, VMError},
    evm::{Control, Evm, Frame},
    message::{CallType, Message},
};
use alloy_primitives::{Bytes, U256};
use veda_state::StateProvider;

pub(super) fn call<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    call_common(evm, frame, CallType::Call)
}

pub(super) fn callcode<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    call_common(evm, frame, CallType::CallCode)
}

pub(super) fn delegatecall<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    call_common(evm, frame, CallType::DelegateCall)
}

pub(super) fn staticcall<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    call_common(evm, frame, CallType::StaticCall)
}

fn call_common<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
    call_type: CallType,
) -> EvmResult<Control> {
    let requested_gas = frame.stack.pop_u64()?;
    let to = frame.stack.pop_address()?;

    // CALL and CALLCODE carry a value word; it is popped for interface compatibility but
    // never moves balances.
    let value = match call_type {
        CallType::Call | CallType::CallCode => frame.stack.pop()?,
        CallType::DelegateCall => frame.msg.value,
        _ => U256::ZERO,
    };
    if call_type == CallType::Call && !value.is_zero() && frame.msg.is_static {
        return Err(EvmError::Vm(VMError::WriteProtection));
    }

    let (in_offset, in_size) = (frame.stack.pop_usize()?, frame.stack.pop_usize()?);
    let (out_offset, out_size) = (frame.stack.pop_usize()?, frame.stack.pop_usize()?);

    charge_memory(frame, in_offset, in_size)?;
    charge_memory(frame, out_offset, out_size)?;

    // EIP-2929 account load for the code target, then the EIP-150 63/64 forwarding cap.
    let load_cost = account_load_cost(evm, to);
    frame.gas.consume_gas(load_cost, "CALL account load")?;

    let remaining = frame.gas.gas_remaining();
    let child_gas = requested_gas.min(remaining - remaining / 64);
    frame.gas.consume_gas(child_gas, "CALL child gas")?;

    let code = evm.state.get_code(to).map_err(EvmError::State)?;
    let data = Bytes::copy_from_slice(frame.memory.read(in_offset, in_size));

    let msg = match call_type {
        CallType::Call => Message {
            call_type,
            gas: child_gas,
            storage_address: to,
            code_address: to,
            sender: frame.msg.storage_address,
            value,
            data,
            code,
            is_static: frame.msg.is_static,
        },
        CallType::CallCode => Message {
            call_type,
            gas: child_gas,
            storage_address: frame.msg.storage_address,
            code_address: to,
            sender: frame.msg.storage_address,
            value,
            data,
            code,
            is_static: frame.msg.is_static,
        },
        CallType::DelegateCall => Message {
            call_type,
            gas: child_gas,
            storage_address: frame.msg.storage_address,
            code_address: to,
            sender: frame.msg.sender,
            value,
            data,
            code,
            is_static: frame.msg.is_static,
        },
        _ => Message {
            call_type,
            gas: child_gas,
            storage_address: to,
            code_address: to,
            sender: frame.msg.storage_address,
            value: U256::ZERO,
            data,
            code,
            is_static: true,
        },
    };

    let child = evm.apply_message(msg, frame.depth + 1)?;

    absorb_child(frame, &child);
    frame.return_data = child.output.clone();
    if !child.output.is_empty() && out_size > 0 {
        let copy_len = child.output.len().min(out_size);
        frame.memory.write(out_offset, &child.output[..copy_len]);
    }
    frame.stack.push_bool(child.is_success())?;
    frame.children.push(child);
    Ok(Control::Continue)
}
