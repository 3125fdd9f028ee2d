//! Jump-destination analysis.

use alloy_primitives::U256;

/// The JUMPDEST opcode byte.
const JUMPDEST: u8 = 0x5b;

/// The first PUSH opcode byte.
const PUSH1: u8 = 0x60;

/// The last PUSH opcode byte.
const PUSH32: u8 = 0x7f;

/// The set of valid jump destinations within a code blob.
///
/// A byte is a valid destination iff it is a JUMPDEST opcode *position*: JUMPDEST bytes
/// inside PUSH immediates do not count, so the analysis walks the code skipping each PUSH's
/// immediate bytes.
#[derive(Debug, Clone, Default)]
pub struct JumpDests {
    valid: Vec<bool>,
}

impl JumpDests {
    /// Analyzes `code`.
    pub fn analyze(code: &[u8]) -> Self {
        let mut valid = vec![false; code.len()];
        let mut pc = 0usize;
        while pc < code.len() {
            let opcode = code[pc];
            if opcode == JUMPDEST {
                valid[pc] = true;
            }
            if (PUSH1..=PUSH32).contains(&opcode) {
                pc += (opcode - PUSH1) as usize + 1;
            }
            pc += 1;
        }
        Self { valid }
    }

    /// Returns `true` if `target` is a valid jump destination.
    pub fn is_valid(&self, target: U256) -> bool {
        usize::try_from(target)
            .ok()
            .and_then(|target| self.valid.get(target).copied())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_jumpdest() {
        // PUSH1 0x03, JUMP, JUMPDEST
        let dests = JumpDests::analyze(&[0x60, 0x03, 0x56, 0x5b]);
        assert!(dests.is_valid(U256::from(3)));
        assert!(!dests.is_valid(U256::from(0)));
        assert!(!dests.is_valid(U256::from(4)));
    }

    #[test]
    fn test_jumpdest_inside_push_immediate_is_invalid() {
        // PUSH2 0x5b5b, JUMPDEST
        let dests = JumpDests::analyze(&[0x61, 0x5b, 0x5b, 0x5b]);
        assert!(!dests.is_valid(U256::from(1)));
        assert!(!dests.is_valid(U256::from(2)));
        assert!(dests.is_valid(U256::from(3)));
    }

    #[test]
    fn test_out_of_range_targets() {
        let dests = JumpDests::analyze(&[0x5b]);
        assert!(dests.is_valid(U256::ZERO));
        assert!(!dests.is_valid(U256::MAX));
    }
}
