//! Storage opcodes with EIP-2929 warm/cold pricing and EIP-3529 net SSTORE metering.

use crate::{
    errors::{EvmError, EvmResult, VMError},
    evm::{Control, Evm, Frame},
    gas::costs,
};
use veda_primitives::constants::{COLD_SLOAD_COST, WARM_STORAGE_READ_COST};
use veda_state::StateProvider;

pub(super) fn sload<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    let slot = frame.stack.pop()?;
    let address = frame.msg.storage_address;

    let cost = if evm.state.mark_storage_warm(address, slot) {
        COLD_SLOAD_COST
    } else {
        WARM_STORAGE_READ_COST
    };
    frame.gas.consume_gas(cost, "SLOAD")?;

    let value = evm.state.get_storage(address, slot).map_err(EvmError::State)?;
    frame.stack.push(value)?;
    Ok(Control::Continue)
}

pub(super) fn sstore<P: StateProvider>(evm: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    if frame.msg.is_static {
        return Err(EvmError::Vm(VMError::WriteProtection));
    }
    // EIP-2200: never leave less than the stipend behind.
    if frame.gas.gas_remaining() <= costs::SSTORE_SENTRY {
        return Err(EvmError::Vm(VMError::OutOfGas("SSTORE sentry")));
    }

    let (slot, new) = (frame.stack.pop()?, frame.stack.pop()?);
    let address = frame.msg.storage_address;

    if evm.state.mark_storage_warm(address, slot) {
        frame.gas.consume_gas(COLD_SLOAD_COST, "SSTORE cold slot")?;
    }

    let current = evm.state.get_storage(address, slot).map_err(EvmError::State)?;
    let original = evm.state.get_original_storage(address, slot).map_err(EvmError::State)?;

    // EIP-3529 net gas metering.
    let cost = if new == current {
        WARM_STORAGE_READ_COST
    } else if current == original {
        if original.is_zero() {
            costs::SSTORE_SET
        } else {
            costs::SSTORE_RESET
        }
    } else {
        WARM_STORAGE_READ_COST
    };
    frame.gas.consume_gas(cost, "SSTORE")?;

    if new != current {
        if current == original {
            if !original.is_zero() && new.is_zero() {
                frame.gas.refund_gas(costs::SSTORE_CLEARS_SCHEDULE);
            }
        } else {
            if !original.is_zero() {
                if current.is_zero() {
                    frame.gas.refund_gas(-costs::SSTORE_CLEARS_SCHEDULE);
                } else if new.is_zero() {
                    frame.gas.refund_gas(costs::SSTORE_CLEARS_SCHEDULE);
                }
            }
            if new == original {
                if original.is_zero() {
                    frame
                        .gas
                        .refund_gas((costs::SSTORE_SET - WARM_STORAGE_READ_COST) as i64);
                } else {
                    frame
                        .gas
                        .refund_gas((costs::SSTORE_RESET - WARM_STORAGE_READ_COST) as i64);
                }
            }
        }
    }

    evm.state.set_storage(address, slot, new).map_err(EvmError::State)?;
    Ok(Control::Continue)
}
