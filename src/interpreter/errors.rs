//! Runtime error types for the processor
//!
//! This module defines [`RuntimeError`], which represents every fault that
//! can stop a running program (as opposed to assembly errors).
//!
//! All runtime errors are fatal - execution halts, and only output already
//! written before the fault can be trusted.

use crate::memory::fault::StackFault;
use crate::parser::isa::Opcode;
use crate::parser::program::DecodeError;
use std::fmt;

/// Faults raised while executing a program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Instruction needed more stack elements than were present
    StackUnderflow {
        opcode: Opcode,
        needed: usize,
        available: usize,
        offset: usize,
    },

    /// `in` executed with no input stream bound
    InputNotBound { offset: usize },

    /// `in` reached the end of the input stream
    InputExhausted { offset: usize },

    /// `in` read a token that is not an integer
    InvalidInput { token: String, offset: usize },

    /// Reading the input stream failed
    InputFailed { message: String, offset: usize },

    /// `mod` with a zero divisor
    DivisionByZero { offset: usize },

    /// The stream could not be decoded at the instruction pointer
    Decode(DecodeError),

    /// Writing to the output stream failed
    OutputFailed { message: String, offset: usize },

    /// The guarded stack detected corruption of its own state
    StackCorrupted { fault: StackFault, offset: usize },
}

impl RuntimeError {
    /// Instruction offset the fault was raised at
    pub fn offset(&self) -> usize {
        match self {
            RuntimeError::StackUnderflow { offset, .. }
            | RuntimeError::InputNotBound { offset }
            | RuntimeError::InputExhausted { offset }
            | RuntimeError::InvalidInput { offset, .. }
            | RuntimeError::InputFailed { offset, .. }
            | RuntimeError::DivisionByZero { offset }
            | RuntimeError::OutputFailed { offset, .. }
            | RuntimeError::StackCorrupted { offset, .. } => *offset,
            RuntimeError::Decode(err) => match *err {
                DecodeError::OutOfBounds { offset }
                | DecodeError::InvalidOpcode { offset, .. }
                | DecodeError::Truncated { offset, .. }
                | DecodeError::InvalidRegister { offset, .. }
                | DecodeError::InvalidJumpTarget { offset, .. } => offset,
            },
        }
    }

    /// Corruption dump, when the fault came from the guarded stack
    pub fn stack_fault(&self) -> Option<&StackFault> {
        match self {
            RuntimeError::StackCorrupted { fault, .. } => Some(fault),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::StackUnderflow {
                opcode,
                needed,
                available,
                offset,
            } => write!(
                f,
                "Stack underflow at offset {}: '{}' needs {} value{}, stack holds {}",
                offset,
                opcode,
                needed,
                if *needed == 1 { "" } else { "s" },
                available
            ),
            RuntimeError::InputNotBound { offset } => {
                write!(f, "No input stream bound for 'in' at offset {}", offset)
            }
            RuntimeError::InputExhausted { offset } => {
                write!(f, "Input exhausted for 'in' at offset {}", offset)
            }
            RuntimeError::InvalidInput { token, offset } => {
                write!(
                    f,
                    "Invalid input '{}' for 'in' at offset {}: expected an integer",
                    token, offset
                )
            }
            RuntimeError::InputFailed { message, offset } => {
                write!(f, "Input failed at offset {}: {}", offset, message)
            }
            RuntimeError::DivisionByZero { offset } => {
                write!(f, "Modulo by zero at offset {}", offset)
            }
            RuntimeError::Decode(err) => write!(f, "Decode error: {}", err),
            RuntimeError::OutputFailed { message, offset } => {
                write!(f, "Output failed at offset {}: {}", offset, message)
            }
            RuntimeError::StackCorrupted { fault, offset } => {
                write!(f, "{} (at offset {})", fault, offset)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<DecodeError> for RuntimeError {
    fn from(err: DecodeError) -> Self {
        RuntimeError::Decode(err)
    }
}
