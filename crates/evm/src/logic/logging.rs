//! The LOG0 through LOG4 opcodes.

use super::charge_memory;
use crate::{
    errors::{EvmError, EvmResult, VMError},
    evm::{Control, Evm, Frame},
    gas::costs,
};
use alloy_primitives::{Bytes, B256};
use veda_primitives::Log;
use veda_state::StateProvider;

pub(super) fn log<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    if frame.msg.is_static {
        return Err(EvmError::Vm(VMError::WriteProtection));
    }

    let topic_count = (frame.current_opcode() - 0xa0) as usize;
    let (offset, size) = (frame.stack.pop_usize()?, frame.stack.pop_usize()?);

    frame.gas.consume_gas(
        costs::LOG_TOPIC * topic_count as u64 + costs::LOG_DATA * size as u64,
        "LOG",
    )?;
    charge_memory(frame, offset, size)?;

    let mut topics = Vec::with_capacity(topic_count);
    for _ in 0..topic_count {
        topics.push(B256::from(frame.stack.pop()?.to_be_bytes::<32>()));
    }

    frame.logs.push(Log {
        address: frame.msg.storage_address,
        topics,
        data: Bytes::copy_from_slice(frame.memory.read(offset, size)),
    });
    Ok(Control::Continue)
}
