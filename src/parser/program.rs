//! Encoded program container
//!
//! A [`Program`] is the flat `i32` stream produced by the assembler together
//! with the resolved label table and a map from instruction offsets back to
//! source lines. The interpreter never reads the stream directly: it asks
//! [`Program::decode`] for a typed [`Instruction`], which validates opcodes,
//! register indices, operand presence and jump targets on the way.

use super::isa::{Opcode, Register};
use rustc_hash::FxHashMap;
use std::fmt;

/// A decoded instruction with its operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Push(i32),
    PushReg(Register),
    Pop,
    PopReg(Register),
    Dup(i32),
    Swp,
    Mov { dst: Register, src: Register },
    MovImm { dst: Register, value: i32 },
    In,
    Out,
    Mul,
    Add,
    Mod,
    Jmp(usize),
    Je(usize),
    Jne(usize),
    End,
    Hlt,
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Push(_) => Opcode::Push,
            Instruction::PushReg(_) => Opcode::PushReg,
            Instruction::Pop => Opcode::Pop,
            Instruction::PopReg(_) => Opcode::PopReg,
            Instruction::Dup(_) => Opcode::Dup,
            Instruction::Swp => Opcode::Swp,
            Instruction::Mov { .. } => Opcode::Mov,
            Instruction::MovImm { .. } => Opcode::MovImm,
            Instruction::In => Opcode::In,
            Instruction::Out => Opcode::Out,
            Instruction::Mul => Opcode::Mul,
            Instruction::Add => Opcode::Add,
            Instruction::Mod => Opcode::Mod,
            Instruction::Jmp(_) => Opcode::Jmp,
            Instruction::Je(_) => Opcode::Je,
            Instruction::Jne(_) => Opcode::Jne,
            Instruction::End => Opcode::End,
            Instruction::Hlt => Opcode::Hlt,
        }
    }

    /// Width of this instruction in the stream
    pub fn slots(&self) -> usize {
        self.opcode().slots()
    }

    /// Append the encoded form to `out`
    pub fn encode(&self, out: &mut Vec<i32>) {
        out.push(self.opcode().code());
        match *self {
            Instruction::Push(value) | Instruction::Dup(value) => out.push(value),
            Instruction::PushReg(reg) | Instruction::PopReg(reg) => out.push(reg.index() as i32),
            Instruction::Mov { dst, src } => {
                out.push(dst.index() as i32);
                out.push(src.index() as i32);
            }
            Instruction::MovImm { dst, value } => {
                out.push(dst.index() as i32);
                out.push(value);
            }
            Instruction::Jmp(target) | Instruction::Je(target) | Instruction::Jne(target) => {
                out.push(target as i32)
            }
            _ => {}
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode();
        match self {
            Instruction::Push(value) | Instruction::Dup(value) => write!(f, "{} {}", op, value),
            Instruction::PushReg(reg) | Instruction::PopReg(reg) => write!(f, "{} {}", op, reg),
            Instruction::Mov { dst, src } => write!(f, "{} {}, {}", op, dst, src),
            Instruction::MovImm { dst, value } => write!(f, "{} {}, {}", op, dst, value),
            Instruction::Jmp(target) | Instruction::Je(target) | Instruction::Jne(target) => {
                write!(f, "{} @{}", op, target)
            }
            _ => write!(f, "{}", op),
        }
    }
}

/// Why the stream could not be decoded at some offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Offset lies outside the stream
    OutOfBounds { offset: usize },
    /// Slot value is not an opcode
    InvalidOpcode { offset: usize, value: i32 },
    /// Stream ends before the opcode's operands
    Truncated { offset: usize, opcode: Opcode },
    /// Register operand outside the register file
    InvalidRegister { offset: usize, value: i32 },
    /// Jump target outside `0..=len`
    InvalidJumpTarget { offset: usize, target: i32 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::OutOfBounds { offset } => {
                write!(f, "offset {} is outside the program", offset)
            }
            DecodeError::InvalidOpcode { offset, value } => {
                write!(f, "invalid opcode {} at offset {}", value, offset)
            }
            DecodeError::Truncated { offset, opcode } => {
                write!(f, "'{}' at offset {} is missing operands", opcode, offset)
            }
            DecodeError::InvalidRegister { offset, value } => {
                write!(f, "invalid register index {} at offset {}", value, offset)
            }
            DecodeError::InvalidJumpTarget { offset, target } => {
                write!(f, "jump target {} at offset {} is outside the program", target, offset)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Assembled program
#[derive(Debug, Clone, Default)]
pub struct Program {
    code: Vec<i32>,
    labels: FxHashMap<String, usize>,
    lines: FxHashMap<usize, usize>,
}

impl Program {
    pub(crate) fn new(
        code: Vec<i32>,
        labels: FxHashMap<String, usize>,
        lines: FxHashMap<usize, usize>,
    ) -> Self {
        Program {
            code,
            labels,
            lines,
        }
    }

    /// Wrap a hand-built stream with no labels or source mapping
    pub fn from_raw(code: Vec<i32>) -> Self {
        Program {
            code,
            ..Default::default()
        }
    }

    pub fn code(&self) -> &[i32] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Resolved offset of a label
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn labels(&self) -> &FxHashMap<String, usize> {
        &self.labels
    }

    /// Source line of the instruction starting at `offset`
    pub fn source_line(&self, offset: usize) -> Option<usize> {
        self.lines.get(&offset).copied()
    }

    /// Decode the instruction starting at `offset`
    pub fn decode(&self, offset: usize) -> Result<Instruction, DecodeError> {
        let value = *self
            .code
            .get(offset)
            .ok_or(DecodeError::OutOfBounds { offset })?;
        let opcode =
            Opcode::from_code(value).ok_or(DecodeError::InvalidOpcode { offset, value })?;

        let operands = self
            .code
            .get(offset + 1..offset + opcode.slots())
            .ok_or(DecodeError::Truncated { offset, opcode })?;

        let register = |value: i32| {
            Register::from_index(value).ok_or(DecodeError::InvalidRegister { offset, value })
        };
        let target = |value: i32| match usize::try_from(value) {
            Ok(target) if target <= self.code.len() => Ok(target),
            _ => Err(DecodeError::InvalidJumpTarget {
                offset,
                target: value,
            }),
        };

        let instruction = match opcode {
            Opcode::Push => Instruction::Push(operands[0]),
            Opcode::PushReg => Instruction::PushReg(register(operands[0])?),
            Opcode::Pop => Instruction::Pop,
            Opcode::PopReg => Instruction::PopReg(register(operands[0])?),
            Opcode::Dup => Instruction::Dup(operands[0]),
            Opcode::Swp => Instruction::Swp,
            Opcode::Mov => Instruction::Mov {
                dst: register(operands[0])?,
                src: register(operands[1])?,
            },
            Opcode::MovImm => Instruction::MovImm {
                dst: register(operands[0])?,
                value: operands[1],
            },
            Opcode::In => Instruction::In,
            Opcode::Out => Instruction::Out,
            Opcode::Mul => Instruction::Mul,
            Opcode::Add => Instruction::Add,
            Opcode::Mod => Instruction::Mod,
            Opcode::Jmp => Instruction::Jmp(target(operands[0])?),
            Opcode::Je => Instruction::Je(target(operands[0])?),
            Opcode::Jne => Instruction::Jne(target(operands[0])?),
            Opcode::End => Instruction::End,
            Opcode::Hlt => Instruction::Hlt,
        };
        Ok(instruction)
    }

    /// Decode the whole stream sequentially
    pub fn disassemble(&self) -> Result<Vec<(usize, Instruction)>, DecodeError> {
        let mut listing = Vec::new();
        let mut offset = 0;
        while offset < self.code.len() {
            let instruction = self.decode(offset)?;
            listing.push((offset, instruction));
            offset += instruction.slots();
        }
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_raw_stream() {
        // push 2; push RBX; mov RCX, 9; jmp @0
        let program = Program::from_raw(vec![0, 2, 1, 1, 7, 2, 9, 13, 0]);
        let listing = program.disassemble().unwrap();

        assert_eq!(
            listing,
            vec![
                (0, Instruction::Push(2)),
                (2, Instruction::PushReg(Register::Rbx)),
                (4, Instruction::MovImm {
                    dst: Register::Rcx,
                    value: 9
                }),
                (7, Instruction::Jmp(0)),
            ]
        );
    }

    #[test]
    fn test_encode_matches_slot_width() {
        let samples = [
            Instruction::Push(-4),
            Instruction::Pop,
            Instruction::PopReg(Register::Rdx),
            Instruction::Mov {
                dst: Register::Rax,
                src: Register::Rbx,
            },
            Instruction::Jne(3),
            Instruction::Hlt,
        ];
        for instruction in samples {
            let mut out = Vec::new();
            instruction.encode(&mut out);
            assert_eq!(out.len(), instruction.slots(), "{}", instruction);
        }
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            Program::from_raw(vec![42]).decode(0),
            Err(DecodeError::InvalidOpcode {
                offset: 0,
                value: 42
            })
        );
        assert_eq!(
            Program::from_raw(vec![6, 0]).decode(0),
            Err(DecodeError::Truncated {
                offset: 0,
                opcode: Opcode::Mov
            })
        );
        assert_eq!(
            Program::from_raw(vec![1, 4]).decode(0),
            Err(DecodeError::InvalidRegister {
                offset: 0,
                value: 4
            })
        );
        assert_eq!(
            Program::from_raw(vec![13, 3]).decode(0),
            Err(DecodeError::InvalidJumpTarget {
                offset: 0,
                target: 3
            })
        );
        assert_eq!(
            Program::from_raw(vec![16]).decode(1),
            Err(DecodeError::OutOfBounds { offset: 1 })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::PopReg(Register::Rax).to_string(), "pop RAX");
        assert_eq!(
            Instruction::MovImm {
                dst: Register::Rbx,
                value: 5
            }
            .to_string(),
            "mov RBX, 5"
        );
        assert_eq!(Instruction::Je(12).to_string(), "je @12");
        assert_eq!(Instruction::Swp.to_string(), "swp");
    }
}
