//! Dispatch for the built-in contracts at addresses 0x01 through 0x09.
//!
//! The cryptographic primitives and their length-derived gas rules come from
//! [revm::precompile]; warm-access marking and the decision to invoke at all stay with the
//! interpreter. A precompile only runs when the forwarded gas covers its fee, and a failed
//! precompile consumes the frame's entire gas budget.

use crate::errors::VMError;
use alloy_primitives::{Address, Bytes};
use revm::precompile::{
    blake2, bn128,
    bn128::{add::ISTANBUL_ADD_GAS_COST, mul::ISTANBUL_MUL_GAS_COST},
    hash, identity, modexp, secp256k1, u64_to_address, Error as PrecompileError,
    PrecompileErrors,
};
use revm::primitives::PrecompileResult;

/// The precompiled-contract function type: input and gas limit to output and gas used.
type PrecompileFn = fn(&Bytes, u64) -> PrecompileResult;

/// The number of precompiled contracts.
const PRECOMPILE_COUNT: u64 = 9;

fn ecadd_run(input: &Bytes, gas_limit: u64) -> PrecompileResult {
    bn128::run_add(input, ISTANBUL_ADD_GAS_COST, gas_limit)
}

fn ecmul_run(input: &Bytes, gas_limit: u64) -> PrecompileResult {
    bn128::run_mul(input, ISTANBUL_MUL_GAS_COST, gas_limit)
}

fn ecpairing_run(input: &Bytes, gas_limit: u64) -> PrecompileResult {
    bn128::run_pair(
        input,
        bn128::pair::ISTANBUL_PAIR_PER_POINT,
        bn128::pair::ISTANBUL_PAIR_BASE,
        gas_limit,
    )
}

/// Returns the precompile registered at `address`, if any.
pub fn precompile_at(address: Address) -> Option<PrecompileFn> {
    let index = (1..=PRECOMPILE_COUNT).find(|&index| u64_to_address(index) == address)?;
    let run: PrecompileFn = match index {
        1 => secp256k1::ec_recover_run,
        2 => hash::sha256_run,
        3 => hash::ripemd160_run,
        4 => identity::identity_run,
        5 => modexp::berlin_run,
        6 => ecadd_run,
        7 => ecmul_run,
        8 => ecpairing_run,
        9 => blake2::run,
        _ => unreachable!(),
    };
    Some(run)
}

/// Returns `true` if `address` hosts a precompiled contract.
pub fn is_precompile(address: Address) -> bool {
    precompile_at(address).is_some()
}

/// Runs the precompile at `address`, returning the output and the gas consumed.
pub fn run_precompile(
    address: Address,
    input: &Bytes,
    gas_limit: u64,
) -> Result<(Bytes, u64), VMError> {
    let run = precompile_at(address).ok_or(VMError::InvalidInstruction(0xfe))?;
    match run(input, gas_limit) {
        Ok(output) => Ok((output.bytes, output.gas_used)),
        Err(PrecompileErrors::Error(PrecompileError::OutOfGas)) => {
            Err(VMError::OutOfGas("precompile fee"))
        }
        Err(_) => Err(VMError::OutOfGas("precompile failure")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn test_registry_bounds() {
        assert!(is_precompile(u64_to_address(1)));
        assert!(is_precompile(u64_to_address(9)));
        assert!(!is_precompile(u64_to_address(0)));
        assert!(!is_precompile(u64_to_address(10)));
        assert!(!is_precompile(Address::repeat_byte(0x42)));
    }

    #[test]
    fn test_identity_echoes_input() {
        let input = Bytes::from_static(&[0x12, 0x34]);
        let (output, gas_used) = run_precompile(u64_to_address(4), &input, 100_000).unwrap();
        assert_eq!(output, input);
        // Identity costs 15 + 3 per word.
        assert_eq!(gas_used, 18);
    }

    #[test]
    fn test_sha256_known_vector() {
        let (output, gas_used) =
            run_precompile(u64_to_address(2), &Bytes::new(), 100_000).unwrap();
        assert_eq!(
            output.as_ref(),
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
        assert_eq!(gas_used, 60);
    }

    #[test]
    fn test_fee_gated_by_forwarded_gas() {
        let result = run_precompile(u64_to_address(2), &Bytes::new(), 59);
        assert!(matches!(result, Err(VMError::OutOfGas(_))));
    }

    #[test]
    fn test_ecrecover_known_vector() {
        // (hash, v, r, s) recovering the canonical test address.
        let input = hex!(
            "456e9aea5e197a1f1af7a3e85a3212fa4049a3ba34c2289b4c860fc0b0c64ef3"
            "000000000000000000000000000000000000000000000000000000000000001c"
            "9242685bf161793cc25603c231bc2f568eb630ea16aa137d2664ac8038825608"
            "4f8ae3bd7535248d0bd448298cc2e2071e56992d0774dc340c368ae950852ada"
        );
        let (output, gas_used) =
            run_precompile(u64_to_address(1), &Bytes::from(input.to_vec()), 100_000).unwrap();
        assert_eq!(gas_used, 3_000);
        assert_eq!(
            output.as_ref(),
            hex!("0000000000000000000000007156526fbd7a3c72969b54f64e42c10fbb768c8a")
        );
    }
}
