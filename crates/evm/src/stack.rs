//! The 1024-word operand stack.

use crate::errors::VMError;
use alloy_primitives::{Address, B256, U256};

/// The per-frame operand stack of 256-bit words, at most 1024 deep.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    items: Vec<U256>,
}

/// The maximum number of words on the operand stack.
const STACK_LIMIT: usize = 1024;

impl Stack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self { items: Vec::with_capacity(32) }
    }

    /// The number of words on the stack.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes a word.
    pub fn push(&mut self, value: U256) -> Result<(), VMError> {
        if self.items.len() == STACK_LIMIT {
            return Err(VMError::FullStack);
        }
        self.items.push(value);
        Ok(())
    }

    /// Pushes an address, zero-extended to a word.
    pub fn push_address(&mut self, address: Address) -> Result<(), VMError> {
        self.push(U256::from_be_slice(address.as_slice()))
    }

    /// Pushes a 32-byte word.
    pub fn push_b256(&mut self, word: B256) -> Result<(), VMError> {
        self.push(U256::from_be_bytes(word.0))
    }

    /// Pushes 1 or 0.
    pub fn push_bool(&mut self, value: bool) -> Result<(), VMError> {
        self.push(if value { U256::from(1) } else { U256::ZERO })
    }

    /// Pops a word.
    pub fn pop(&mut self) -> Result<U256, VMError> {
        self.items.pop().ok_or(VMError::InsufficientStack)
    }

    /// Pops a word, truncating to the low 20 bytes as an address.
    pub fn pop_address(&mut self) -> Result<Address, VMError> {
        let word = self.pop()?;
        Ok(Address::from_slice(&word.to_be_bytes::<32>()[12..]))
    }

    /// Pops a word as a usize, saturating on overflow. Offsets and lengths past the
    /// addressable range fail later at the memory gas charge.
    pub fn pop_usize(&mut self) -> Result<usize, VMError> {
        let word = self.pop()?;
        Ok(usize::try_from(word).unwrap_or(usize::MAX))
    }

    /// Pops a word as a u64, saturating on overflow.
    pub fn pop_u64(&mut self) -> Result<u64, VMError> {
        let word = self.pop()?;
        Ok(u64::try_from(word).unwrap_or(u64::MAX))
    }

    /// Duplicates the `position`-th word from the top (1-indexed).
    pub fn dup(&mut self, position: usize) -> Result<(), VMError> {
        if self.items.len() < position {
            return Err(VMError::InsufficientStack);
        }
        let value = self.items[self.items.len() - position];
        self.push(value)
    }

    /// Swaps the top word with the `position`-th word below it (1-indexed).
    pub fn swap(&mut self, position: usize) -> Result<(), VMError> {
        let len = self.items.len();
        if len < position + 1 {
            return Err(VMError::InsufficientStack);
        }
        self.items.swap(len - 1, len - 1 - position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut stack = Stack::new();
        stack.push(U256::from(42)).unwrap();
        assert_eq!(stack.pop().unwrap(), U256::from(42));
        assert_eq!(stack.pop(), Err(VMError::InsufficientStack));
    }

    #[test]
    fn test_stack_limit() {
        let mut stack = Stack::new();
        for i in 0..STACK_LIMIT {
            stack.push(U256::from(i)).unwrap();
        }
        assert_eq!(stack.push(U256::ZERO), Err(VMError::FullStack));
    }

    #[test]
    fn test_address_truncation() {
        let mut stack = Stack::new();
        stack.push(U256::MAX).unwrap();
        assert_eq!(stack.pop_address().unwrap(), Address::repeat_byte(0xff));
    }

    #[test]
    fn test_dup_swap() {
        let mut stack = Stack::new();
        stack.push(U256::from(1)).unwrap();
        stack.push(U256::from(2)).unwrap();

        stack.dup(2).unwrap();
        assert_eq!(stack.pop().unwrap(), U256::from(1));

        stack.swap(1).unwrap();
        assert_eq!(stack.pop().unwrap(), U256::from(1));
        assert_eq!(stack.pop().unwrap(), U256::from(2));
        assert_eq!(stack.swap(1), Err(VMError::InsufficientStack));
    }
}
