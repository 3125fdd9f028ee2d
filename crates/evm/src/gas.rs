//! The gas meter and the opcode gas schedule.

use crate::errors::VMError;
use crate::memory::words;
use tracing::trace;

/// Gas costs not already fixed by the dispatch table.
pub mod costs {
    /// Cost per 32-byte word hashed by KECCAK256.
    pub const KECCAK256_WORD: u64 = 6;
    /// Cost per 32-byte word moved by the copy opcodes.
    pub const COPY_WORD: u64 = 3;
    /// Cost per byte of the exponent in EXP.
    pub const EXP_BYTE: u64 = 50;
    /// Base cost of a LOG opcode.
    pub const LOG: u64 = 375;
    /// Cost per LOG topic.
    pub const LOG_TOPIC: u64 = 375;
    /// Cost per byte of LOG data.
    pub const LOG_DATA: u64 = 8;
    /// EIP-3529 SSTORE cost when setting a zero slot to non-zero.
    pub const SSTORE_SET: u64 = 20_000;
    /// EIP-3529 SSTORE cost when changing a non-zero slot, net of the cold charge.
    pub const SSTORE_RESET: u64 = 2_900;
    /// EIP-3529 refund for clearing a non-zero slot.
    pub const SSTORE_CLEARS_SCHEDULE: i64 = 4_800;
    /// EIP-2200: SSTORE aborts when the frame holds no more than this much gas.
    pub const SSTORE_SENTRY: u64 = 2_300;
    /// Linear coefficient of the memory expansion cost.
    pub const MEMORY_WORD: u64 = 3;
    /// Quadratic divisor of the memory expansion cost.
    pub const MEMORY_QUAD_DENOMINATOR: u64 = 512;
}

/// The cost of a memory footprint of `byte_len` bytes: linear plus quadratic in words.
pub const fn memory_cost(byte_len: usize) -> u64 {
    let words = words(byte_len) as u64;
    costs::MEMORY_WORD * words + words * words / costs::MEMORY_QUAD_DENOMINATOR
}

/// The per-frame gas meter.
///
/// The refund counter follows the allow-negative-refund strategy: net SSTORE metering may
/// drive it below zero mid-transaction; it is clamped when the transaction settles.
#[derive(Debug, Clone)]
pub struct GasMeter {
    start_gas: u64,
    gas_remaining: u64,
    gas_refunded: i64,
}

impl GasMeter {
    /// Creates a meter holding `start_gas`.
    pub const fn new(start_gas: u64) -> Self {
        Self { start_gas, gas_remaining: start_gas, gas_refunded: 0 }
    }

    /// The gas still available to the frame.
    pub const fn gas_remaining(&self) -> u64 {
        self.gas_remaining
    }

    /// The gas consumed so far.
    pub const fn gas_used(&self) -> u64 {
        self.start_gas - self.gas_remaining
    }

    /// The net refund accumulated so far. May be negative mid-transaction.
    pub const fn gas_refunded(&self) -> i64 {
        self.gas_refunded
    }

    /// Debits `amount`, raising [VMError::OutOfGas] when the meter cannot cover it.
    pub fn consume_gas(&mut self, amount: u64, reason: &'static str) -> Result<(), VMError> {
        if amount > self.gas_remaining {
            trace!(
                target: "evm",
                amount,
                remaining = self.gas_remaining,
                reason,
                "Out of gas",
            );
            return Err(VMError::OutOfGas(reason));
        }
        self.gas_remaining -= amount;
        Ok(())
    }

    /// Credits gas returned by a child frame.
    pub fn return_gas(&mut self, amount: u64) {
        self.gas_remaining += amount;
    }

    /// Adjusts the refund counter.
    pub fn refund_gas(&mut self, amount: i64) {
        self.gas_refunded += amount;
    }

    /// Consumes everything left in the meter. Used when an error burns the frame's gas.
    pub fn consume_all(&mut self) {
        self.gas_remaining = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_and_out_of_gas() {
        let mut meter = GasMeter::new(100);
        meter.consume_gas(60, "step").unwrap();
        assert_eq!(meter.gas_remaining(), 40);
        assert_eq!(meter.gas_used(), 60);
        assert!(matches!(meter.consume_gas(41, "step"), Err(VMError::OutOfGas(_))));
        // A failed charge leaves the meter untouched.
        assert_eq!(meter.gas_remaining(), 40);
    }

    #[test]
    fn test_negative_refund_allowed() {
        let mut meter = GasMeter::new(10);
        meter.refund_gas(costs::SSTORE_CLEARS_SCHEDULE);
        meter.refund_gas(-2 * costs::SSTORE_CLEARS_SCHEDULE);
        assert_eq!(meter.gas_refunded(), -costs::SSTORE_CLEARS_SCHEDULE);
    }

    #[test]
    fn test_memory_cost_quadratic() {
        assert_eq!(memory_cost(0), 0);
        assert_eq!(memory_cost(32), 3);
        assert_eq!(memory_cost(64), 6);
        // 1024 words: 3*1024 + 1024^2/512 = 5120.
        assert_eq!(memory_cost(32 * 1024), 5120);
    }
}
