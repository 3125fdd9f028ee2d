//! Opcode handlers and the dense dispatch table.

use crate::{
    errors::{EvmError, EvmResult, VMError},
    evm::{Control, Evm, Frame, Instruction},
    gas::memory_cost,
};
use alloy_primitives::Address;
use veda_primitives::constants::{COLD_ACCOUNT_ACCESS_COST, WARM_STORAGE_READ_COST};
use veda_state::StateProvider;

mod arithmetic;
mod bitwise;
mod call;
mod context;
mod flow;
mod logging;
mod stack_memory;
mod storage;
mod system;

/// Charges memory-expansion gas for the `[offset, offset + size)` range and extends the
/// frame memory to cover it.
pub(crate) fn charge_memory(frame: &mut Frame, offset: usize, size: usize) -> EvmResult<()> {
    if size == 0 {
        return Ok(());
    }
    let end = offset.checked_add(size).ok_or(VMError::OutOfGas("memory expansion"))?;
    let new_cost = memory_cost(end);
    let current_cost = memory_cost(frame.memory.len());
    if new_cost > current_cost {
        frame.gas.consume_gas(new_cost - current_cost, "memory expansion")?;
    }
    frame.memory.extend(offset, size);
    Ok(())
}

/// EIP-2929: marks `address` warm and charges the cold or warm account-access cost.
pub(crate) fn consume_account_load<P: StateProvider>(
    evm: &mut Evm<'_, P>,
    frame: &mut Frame,
    address: Address,
    reason: &'static str,
) -> EvmResult<()> {
    let cost = account_load_cost(evm, address);
    frame.gas.consume_gas(cost, reason)?;
    Ok(())
}

/// EIP-2929: marks `address` warm and returns the access cost without charging it.
pub(crate) fn account_load_cost<P: StateProvider>(evm: &mut Evm<'_, P>, address: Address) -> u64 {
    if evm.state.mark_address_warm(address) {
        COLD_ACCOUNT_ACCESS_COST
    } else {
        WARM_STORAGE_READ_COST
    }
}

/// Settles a child frame against its parent: unused gas and refunds come back, and a
/// successful child's logs and deletion marks merge upward in program order.
pub(crate) fn absorb_child(frame: &mut Frame, child: &crate::computation::Computation) {
    frame.gas.return_gas(child.gas_remaining);
    frame.gas.refund_gas(child.gas_refund());
    if child.is_success() {
        frame.logs.extend(child.logs.iter().cloned());
        for address in &child.accounts_to_delete {
            if !frame.accounts_to_delete.contains(address) {
                frame.accounts_to_delete.push(*address);
            }
        }
    }
}

fn invalid_op<P: StateProvider>(_: &mut Evm<'_, P>, frame: &mut Frame) -> EvmResult<Control> {
    Err(EvmError::Vm(VMError::InvalidInstruction(frame.current_opcode())))
}

/// Builds the 256-entry dispatch table. Undefined opcodes raise
/// [VMError::InvalidInstruction].
pub(crate) fn dispatch_table<P: StateProvider>() -> Box<[Instruction<P>; 256]> {
    let mut table: Vec<Instruction<P>> = (0..=255u16)
        .map(|_| Instruction { name: "INVALID", gas: 0, execute: invalid_op })
        .collect();

    let mut set = |opcode: u8, name: &'static str, gas: u64, execute: crate::evm::OpFn<P>| {
        table[opcode as usize] = Instruction { name, gas, execute };
    };

    set(0x00, "STOP", 0, flow::stop);
    set(0x01, "ADD", 3, arithmetic::add);
    set(0x02, "MUL", 5, arithmetic::mul);
    set(0x03, "SUB", 3, arithmetic::sub);
    set(0x04, "DIV", 5, arithmetic::div);
    set(0x05, "SDIV", 5, arithmetic::sdiv);
    set(0x06, "MOD", 5, arithmetic::mod_);
    set(0x07, "SMOD", 5, arithmetic::smod);
    set(0x08, "ADDMOD", 8, arithmetic::addmod);
    set(0x09, "MULMOD", 8, arithmetic::mulmod);
    set(0x0a, "EXP", 10, arithmetic::exp);
    set(0x0b, "SIGNEXTEND", 5, arithmetic::signextend);

    set(0x10, "LT", 3, bitwise::lt);
    set(0x11, "GT", 3, bitwise::gt);
    set(0x12, "SLT", 3, bitwise::slt);
    set(0x13, "SGT", 3, bitwise::sgt);
    set(0x14, "EQ", 3, bitwise::eq);
    set(0x15, "ISZERO", 3, bitwise::iszero);
    set(0x16, "AND", 3, bitwise::and);
    set(0x17, "OR", 3, bitwise::or);
    set(0x18, "XOR", 3, bitwise::xor);
    set(0x19, "NOT", 3, bitwise::not);
    set(0x1a, "BYTE", 3, bitwise::byte);
    set(0x1b, "SHL", 3, bitwise::shl);
    set(0x1c, "SHR", 3, bitwise::shr);
    set(0x1d, "SAR", 3, bitwise::sar);

    set(0x20, "KECCAK256", 30, context::keccak256);

    set(0x30, "ADDRESS", 2, context::address);
    set(0x31, "BALANCE", 0, context::balance);
    set(0x32, "ORIGIN", 2, context::origin);
    set(0x33, "CALLER", 2, context::caller);
    set(0x34, "CALLVALUE", 2, context::callvalue);
    set(0x35, "CALLDATALOAD", 3, context::calldataload);
    set(0x36, "CALLDATASIZE", 2, context::calldatasize);
    set(0x37, "CALLDATACOPY", 3, context::calldatacopy);
    set(0x38, "CODESIZE", 2, context::codesize);
    set(0x39, "CODECOPY", 3, context::codecopy);
    set(0x3a, "GASPRICE", 2, context::gasprice);
    set(0x3b, "EXTCODESIZE", 0, context::extcodesize);
    set(0x3c, "EXTCODECOPY", 0, context::extcodecopy);
    set(0x3d, "RETURNDATASIZE", 2, context::returndatasize);
    set(0x3e, "RETURNDATACOPY", 3, context::returndatacopy);
    set(0x3f, "EXTCODEHASH", 0, context::extcodehash);

    set(0x40, "BLOCKHASH", 20, context::blockhash);
    set(0x41, "COINBASE", 2, context::coinbase);
    set(0x42, "TIMESTAMP", 2, context::timestamp);
    set(0x43, "NUMBER", 2, context::number);
    set(0x44, "PREVRANDAO", 2, context::prevrandao);
    set(0x45, "GASLIMIT", 2, context::gaslimit);
    set(0x46, "CHAINID", 2, context::chainid);
    set(0x47, "SELFBALANCE", 5, context::selfbalance);
    set(0x48, "BASEFEE", 2, context::basefee);

    set(0x50, "POP", 2, stack_memory::pop);
    set(0x51, "MLOAD", 3, stack_memory::mload);
    set(0x52, "MSTORE", 3, stack_memory::mstore);
    set(0x53, "MSTORE8", 3, stack_memory::mstore8);
    set(0x54, "SLOAD", 0, storage::sload);
    set(0x55, "SSTORE", 0, storage::sstore);
    set(0x56, "JUMP", 8, flow::jump);
    set(0x57, "JUMPI", 10, flow::jumpi);
    set(0x58, "PC", 2, flow::pc);
    set(0x59, "MSIZE", 2, stack_memory::msize);
    set(0x5a, "GAS", 2, flow::gas);
    set(0x5b, "JUMPDEST", 1, flow::jumpdest);
    set(0x5f, "PUSH0", 2, stack_memory::push0);

    for opcode in 0x60..=0x7f {
        set(opcode, "PUSH", 3, stack_memory::push);
    }
    for opcode in 0x80..=0x8f {
        set(opcode, "DUP", 3, stack_memory::dup);
    }
    for opcode in 0x90..=0x9f {
        set(opcode, "SWAP", 3, stack_memory::swap);
    }
    for opcode in 0xa0..=0xa4 {
        set(opcode, "LOG", 375, logging::log);
    }

    set(0xf0, "CREATE", 32_000, system::create);
    set(0xf1, "CALL", 0, call::call);
    set(0xf2, "CALLCODE", 0, call::callcode);
    set(0xf3, "RETURN", 0, flow::return_op);
    set(0xf4, "DELEGATECALL", 0, call::delegatecall);
    set(0xf5, "CREATE2", 32_000, system::create2);
    set(0xfa, "STATICCALL", 0, call::staticcall);
    set(0xfd, "REVERT", 0, flow::revert);
    set(0xfe, "INVALID", 0, invalid_op);
    set(0xff, "SELFDESTRUCT", 5_000, system::selfdestruct);

    let table: Box<[Instruction<P>; 256]> =
        table.into_boxed_slice().try_into().expect("table has 256 entries");
    table
}
