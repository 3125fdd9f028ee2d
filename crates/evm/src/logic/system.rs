//! CREATE, CREATE2, and SELFDESTRUCT.

use super::{absorb_child, charge_memory};
use crate::{
    errors::{EvmError, EvmResult, VMError},
    evm::{Control, Evm, Frame},
    gas::costs,
    memory::words,
    message::{CallType, Message},
};
use alloy_primitives::{Address, Bytes, B256, U256};
use veda_primitives::{
    constants::COLD_ACCOUNT_ACCESS_COST, generate_contract_address,
    generate_safe_contract_address,
};
use veda_state::StateProvider;

pub(super) fn create<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    create_common(evm, frame, CallType::Create)
}

pub(super) fn create2<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    create_common(evm, frame, CallType::Create2)
}

fn create_common<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
    call_type: CallType,
) -> EvmResult<Control> {
    if frame.msg.is_static {
        return Err(EvmError::Vm(VMError::WriteProtection));
    }

    let value = frame.stack.pop()?;
    let (offset, size) = (frame.stack.pop_usize()?, frame.stack.pop_usize()?);
    let salt = if call_type == CallType::Create2 {
        let salt = B256::from(frame.stack.pop()?.to_be_bytes::<32>());
        // CREATE2 pays to hash the initcode for the address derivation.
        frame
            .gas
            .consume_gas(costs::KECCAK256_WORD * words(size) as u64, "CREATE2 hash")?;
        Some(salt)
    } else {
        None
    };

    charge_memory(frame, offset, size)?;
    let initcode = Bytes::copy_from_slice(frame.memory.read(offset, size));

    // EIP-150: a creation forwards all but one 64th of the remaining gas.
    let remaining = frame.gas.gas_remaining();
    let child_gas = remaining - remaining / 64;
    frame.gas.consume_gas(child_gas, "CREATE child gas")?;

    let creator = frame.msg.storage_address;
    evm.state.increment_nonce(creator).map_err(EvmError::State)?;
    let creation_nonce = evm.state.get_nonce(creator).map_err(EvmError::State)? - 1;

    let contract_address = match salt {
        Some(salt) => generate_safe_contract_address(creator, salt, &initcode),
        None => generate_contract_address(creator, creation_nonce),
    };
    evm.state.mark_address_warm(contract_address);

    let msg = Message {
        call_type,
        gas: child_gas,
        storage_address: contract_address,
        code_address: contract_address,
        sender: creator,
        value,
        data: Bytes::new(),
        code: initcode,
        is_static: false,
    };
    let child = evm.apply_create_message(msg, frame.depth + 1)?;

    absorb_child(frame, &child);
    if child.is_success() {
        frame.return_data = Bytes::new();
        frame.stack.push_address(contract_address)?;
    } else {
        frame.return_data = child.output.clone();
        frame.stack.push(U256::ZERO)?;
    }
    frame.children.push(child);
    Ok(Control::Continue)
}

pub(super) fn selfdestruct<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
) -> EvmResult<Control> {
    if frame.msg.is_static {
        return Err(EvmError::Vm(VMError::WriteProtection));
    }

    let beneficiary: Address = frame.stack.pop_address()?;
    if evm.state.mark_address_warm(beneficiary) {
        frame.gas.consume_gas(COLD_ACCOUNT_ACCESS_COST, "SELFDESTRUCT cold beneficiary")?;
    }

    // No balance moves; the beneficiary is still touched for EIP-161 cleanup.
    evm.state.touch_account(beneficiary);

    let target = frame.msg.storage_address;
    if !frame.accounts_to_delete.contains(&target) {
        frame.accounts_to_delete.push(target);
    }
    Ok(Control::Stop)
}
