//! Interpreter tests over an in-memory state.

use crate::{
    BlockEnv, CallType, Evm, Message, TransactionContext, VMError,
};
use alloy_primitives::{hex, Address, Bytes, U256};
use veda_state::{MemoryStateProvider, State};
use veda_trie::EMPTY_ROOT_HASH;

fn fresh_state() -> State<MemoryStateProvider> {
    State::new(EMPTY_ROOT_HASH, MemoryStateProvider::new())
}

fn call_msg(target: Address, code: &[u8], data: &[u8], gas: u64) -> Message {
    Message {
        call_type: CallType::Call,
        gas,
        storage_address: target,
        code_address: target,
        sender: Address::repeat_byte(0xee),
        value: U256::ZERO,
        data: Bytes::copy_from_slice(data),
        code: Bytes::copy_from_slice(code),
        is_static: false,
    }
}

fn run(
    state: &mut State<MemoryStateProvider>,
    code: &[u8],
    data: &[u8],
    gas: u64,
) -> crate::Computation {
    let block = BlockEnv::default();
    let mut evm = Evm::new(state, &block, TransactionContext::new(Address::repeat_byte(0xee)));
    let msg = call_msg(Address::repeat_byte(0xc0), code, data, gas);
    evm.apply_message(msg, 0).unwrap()
}

#[test]
fn test_add_and_return() {
    // PUSH1 2, PUSH1 3, ADD, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
    let code = hex!("600260030160005260206000f3");
    let mut state = fresh_state();
    let computation = run(&mut state, &code, &[], 100_000);

    assert!(computation.is_success());
    assert_eq!(U256::from_be_slice(&computation.output), U256::from(5));
    // Seven 3-gas ops plus one word of memory expansion.
    assert_eq!(computation.gas_used(), 24);
}

#[test]
fn test_out_of_gas_burns_frame() {
    let code = hex!("600260030160005260206000f3");
    let mut state = fresh_state();
    let computation = run(&mut state, &code, &[], 10);

    assert!(matches!(computation.error, Some(VMError::OutOfGas(_))));
    assert_eq!(computation.gas_remaining, 0);
    assert_eq!(computation.gas_used(), 10);
}

#[test]
fn test_identity_precompile() {
    let mut state = fresh_state();
    let block = BlockEnv::default();
    let mut evm = Evm::new(&mut state, &block, TransactionContext::default());

    let target = Address::with_last_byte(0x04);
    let msg = Message {
        code_address: target,
        storage_address: target,
        ..call_msg(target, &[], &hex!("1234"), 1_000)
    };
    let computation = evm.apply_message(msg, 0).unwrap();

    assert!(computation.is_success());
    assert_eq!(computation.output.as_ref(), hex!("1234"));
    assert_eq!(computation.gas_used(), 18);
}

#[test]
fn test_precompile_fee_exceeds_gas() {
    let mut state = fresh_state();
    let block = BlockEnv::default();
    let mut evm = Evm::new(&mut state, &block, TransactionContext::default());

    let target = Address::with_last_byte(0x02);
    let msg = Message {
        code_address: target,
        storage_address: target,
        ..call_msg(target, &[], &[], 59)
    };
    let computation = evm.apply_message(msg, 0).unwrap();

    assert!(matches!(computation.error, Some(VMError::OutOfGas(_))));
    assert_eq!(computation.gas_remaining, 0);
}

#[test]
fn test_revert_restores_storage_and_returns_gas() {
    // PUSH1 1, PUSH1 0, SSTORE, PUSH1 0, PUSH1 0, REVERT
    let code = hex!("600160005560006000fd");
    let mut state = fresh_state();
    let computation = run(&mut state, &code, &[], 100_000);

    assert_eq!(computation.error, Some(VMError::Revert));
    // REVERT returns the unspent gas, unlike the burning errors.
    assert!(computation.gas_remaining > 0);
    assert_eq!(
        state.get_storage(Address::repeat_byte(0xc0), U256::ZERO).unwrap(),
        U256::ZERO
    );
}

#[test]
fn test_second_account_access_is_warm() {
    // PUSH20 x, BALANCE, POP, PUSH20 x, BALANCE, POP
    let mut code = Vec::new();
    for _ in 0..2 {
        code.push(0x73);
        code.extend_from_slice(&[0x11; 20]);
        code.push(0x31);
        code.push(0x50);
    }
    let mut state = fresh_state();
    let computation = run(&mut state, &code, &[], 100_000);

    assert!(computation.is_success());
    // 3 + 2600 + 2 cold, then 3 + 100 + 2 warm.
    assert_eq!(computation.gas_used(), 2_710);
}

#[test]
fn test_sstore_refund_for_clearing_fresh_write() {
    // PUSH1 1, PUSH1 0, SSTORE, PUSH1 0, PUSH1 0, SSTORE
    let code = hex!("60016000556000600055");
    let mut state = fresh_state();
    let computation = run(&mut state, &code, &[], 100_000);

    assert!(computation.is_success());
    // Writing back the original zero refunds SSTORE_SET minus the warm read.
    assert_eq!(computation.gas_refund(), 19_900);
}

#[test]
fn test_write_protection_in_static_frame() {
    let code = hex!("6001600055");
    let mut state = fresh_state();
    let block = BlockEnv::default();
    let mut evm = Evm::new(&mut state, &block, TransactionContext::default());

    let mut msg = call_msg(Address::repeat_byte(0xc0), &code, &[], 100_000);
    msg.is_static = true;
    msg.call_type = CallType::StaticCall;
    let computation = evm.apply_message(msg, 0).unwrap();

    assert_eq!(computation.error, Some(VMError::WriteProtection));
}

#[test]
fn test_invalid_jump_destination() {
    // PUSH1 3, JUMP: the target is a STOP, not a JUMPDEST.
    let code = hex!("60035600");
    let mut state = fresh_state();
    let computation = run(&mut state, &code, &[], 100_000);
    assert_eq!(computation.error, Some(VMError::InvalidJumpDestination));

    // PUSH1 4, JUMP, STOP, JUMPDEST, STOP: landing on the JUMPDEST is fine.
    let code = hex!("600456005b00");
    let mut state = fresh_state();
    let computation = run(&mut state, &code, &[], 100_000);
    assert!(computation.is_success());
}

#[test]
fn test_create_deploys_code() {
    // Initcode: PUSH1 0xff, PUSH1 0, MSTORE8, PUSH1 1, PUSH1 0, RETURN. Deploys 0xff.
    let initcode = hex!("60ff60005360016000f3");
    let mut state = fresh_state();
    let block = BlockEnv::default();
    let mut evm = Evm::new(&mut state, &block, TransactionContext::default());

    let contract = Address::repeat_byte(0xca);
    let msg = Message {
        call_type: CallType::Create,
        gas: 200_000,
        storage_address: contract,
        code_address: contract,
        sender: Address::repeat_byte(0xee),
        value: U256::ZERO,
        data: Bytes::new(),
        code: Bytes::copy_from_slice(&initcode),
        is_static: false,
    };
    let computation = evm.apply_create_message(msg, 0).unwrap();

    assert!(computation.is_success());
    assert_eq!(state.get_code(contract).unwrap().as_ref(), [0xff]);
    // EIP-161: the new contract starts at nonce 1.
    assert_eq!(state.get_nonce(contract).unwrap(), 1);
}

#[test]
fn test_create_rejects_reserved_byte() {
    // Initcode deploying a single 0xef byte.
    let initcode = hex!("60ef60005360016000f3");
    let mut state = fresh_state();
    let block = BlockEnv::default();
    let mut evm = Evm::new(&mut state, &block, TransactionContext::default());

    let contract = Address::repeat_byte(0xcb);
    let msg = Message {
        call_type: CallType::Create,
        gas: 200_000,
        storage_address: contract,
        code_address: contract,
        sender: Address::repeat_byte(0xee),
        value: U256::ZERO,
        data: Bytes::new(),
        code: Bytes::copy_from_slice(&initcode),
        is_static: false,
    };
    let computation = evm.apply_create_message(msg, 0).unwrap();

    assert_eq!(computation.error, Some(VMError::ReservedBytesInCode));
    assert_eq!(state.get_code(contract).unwrap(), Bytes::new());
}

#[test]
fn test_nested_call_reports_child_failure() {
    let mut state = fresh_state();
    let callee = Address::repeat_byte(0xbb);
    // Callee: PUSH1 0, PUSH1 0, REVERT.
    state.set_code(callee, Bytes::from_static(&hex!("60006000fd"))).unwrap();

    // Caller: CALL(gas=0xffff, to=callee, value=0, in=0/0, out=0/0), then return the flag.
    let mut code = vec![0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x73];
    code.extend_from_slice(callee.as_slice());
    code.extend_from_slice(&hex!("61fffff160005260206000f3"));

    let computation = run(&mut state, &code, &[], 200_000);
    assert!(computation.is_success());
    assert_eq!(U256::from_be_slice(&computation.output), U256::ZERO);
    assert_eq!(computation.children.len(), 1);
    assert_eq!(computation.children[0].error, Some(VMError::Revert));
}

#[test]
fn test_logs_from_reverted_child_are_dropped() {
    let mut state = fresh_state();
    let callee = Address::repeat_byte(0xbb);
    // Callee: LOG0 over empty memory, then REVERT.
    state.set_code(callee, Bytes::from_static(&hex!("60006000a060006000fd"))).unwrap();

    let mut code = vec![0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x73];
    code.extend_from_slice(callee.as_slice());
    code.extend_from_slice(&hex!("61fffff100"));

    let computation = run(&mut state, &code, &[], 200_000);
    assert!(computation.is_success());
    assert!(computation.logs.is_empty());
}

#[test]
fn test_selfdestruct_schedules_deletion() {
    // PUSH20 beneficiary, SELFDESTRUCT.
    let mut code = vec![0x73];
    code.extend_from_slice(&[0x22; 20]);
    code.push(0xff);

    let mut state = fresh_state();
    let computation = run(&mut state, &code, &[], 100_000);

    assert!(computation.is_success());
    assert_eq!(computation.accounts_to_delete, vec![Address::repeat_byte(0xc0)]);
    // PUSH20 + SELFDESTRUCT + cold beneficiary load.
    assert_eq!(computation.gas_used(), 3 + 5_000 + 2_600);
}
