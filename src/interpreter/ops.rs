//! Stack and arithmetic operations
//!
//! Binary operations pop `first` (the top) and then `second`. `mod` computes
//! `second % first`, so `push a / push b / mod` yields `a % b`.

use crate::interpreter::engine::Processor;
use crate::interpreter::errors::RuntimeError;
use crate::memory::fault::StackFault;
use crate::parser::isa::Opcode;
use std::io::Write;

fn corrupted(fault: StackFault, offset: usize) -> RuntimeError {
    RuntimeError::StackCorrupted { fault, offset }
}

impl<W: Write> Processor<W> {
    pub(crate) fn push_value(&mut self, value: i32, offset: usize) -> Result<(), RuntimeError> {
        self.stack
            .push(value)
            .map_err(|fault| corrupted(fault, offset))
    }

    /// Pop `N` values in pop order, checking the depth first so an underflow
    /// leaves the stack untouched
    pub(crate) fn pop_operands<const N: usize>(
        &mut self,
        opcode: Opcode,
        offset: usize,
    ) -> Result<[i32; N], RuntimeError> {
        self.stack.check().map_err(|fault| corrupted(fault, offset))?;
        let available = self.stack.len().map_err(|fault| corrupted(fault, offset))?;
        if available < N {
            return Err(RuntimeError::StackUnderflow {
                opcode,
                needed: N,
                available,
                offset,
            });
        }

        let mut values = [0; N];
        for slot in values.iter_mut() {
            *slot = self
                .stack
                .pop()
                .map_err(|fault| corrupted(fault, offset))?
                .ok_or(RuntimeError::StackUnderflow {
                    opcode,
                    needed: N,
                    available,
                    offset,
                })?;
        }
        Ok(values)
    }

    /// `dup n`: take the top pair and push it back `n` times in its original order
    pub(crate) fn execute_duplicate(&mut self, count: i32, offset: usize) -> Result<(), RuntimeError> {
        let [first, second] = self.pop_operands::<2>(Opcode::Dup, offset)?;
        for _ in 0..count.max(0) {
            self.push_value(second, offset)?;
            self.push_value(first, offset)?;
        }
        Ok(())
    }

    /// `swp`: exchange the top two values
    pub(crate) fn execute_swap(&mut self, offset: usize) -> Result<(), RuntimeError> {
        let [first, second] = self.pop_operands::<2>(Opcode::Swp, offset)?;
        self.push_value(first, offset)?;
        self.push_value(second, offset)
    }

    /// `mul`, `add`, `mod` with wrapping two's-complement semantics
    pub(crate) fn execute_arithmetic(
        &mut self,
        opcode: Opcode,
        offset: usize,
    ) -> Result<(), RuntimeError> {
        let [first, second] = self.pop_operands::<2>(opcode, offset)?;
        let result = match opcode {
            Opcode::Mul => second.wrapping_mul(first),
            Opcode::Add => second.wrapping_add(first),
            Opcode::Mod => {
                if first == 0 {
                    return Err(RuntimeError::DivisionByZero { offset });
                }
                second.wrapping_rem(first)
            }
            other => unreachable!("{} is not an arithmetic opcode", other),
        };
        self.push_value(result, offset)
    }
}
