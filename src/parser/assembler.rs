//! Two-pass assembler
//!
//! Pass 1 walks the lexed lines, binding every label to the offset the next
//! instruction will be encoded at. Pass 2 encodes each instruction, resolving
//! jump operands through the label table.
//!
//! Both passes choose the opcode for a line with [`select_opcode`] and take
//! its width from [`Opcode::slots`], so label offsets cannot drift from the
//! encoded stream.

use super::errors::{ParseError, ParseErrorKind};
use super::isa::{Mnemonic, Opcode};
use super::lexer::{Lexer, Operand, SourceLine, SourceLocation};
use super::program::{Instruction, Program};
use rustc_hash::FxHashMap;

/// Assembler for a single source text
pub struct Assembler {
    lines: Vec<SourceLine>,
}

impl Assembler {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let lines = Lexer::new(source).tokenize()?;
        Ok(Assembler { lines })
    }

    /// Run both passes and produce the encoded program
    pub fn assemble(&self) -> Result<Program, ParseError> {
        let labels = self.discover_labels()?;
        self.encode(labels)
    }

    /// Pass 1: bind labels to instruction offsets
    fn discover_labels(&self) -> Result<FxHashMap<String, (usize, usize)>, ParseError> {
        let mut labels: FxHashMap<String, (usize, usize)> = FxHashMap::default();
        let mut position = 0;

        for line in &self.lines {
            match line {
                SourceLine::Label { name, location } => {
                    if let Some(&(_, first_line)) = labels.get(name) {
                        return Err(ParseError::new(
                            ParseErrorKind::DuplicateLabel {
                                name: name.clone(),
                                first_line,
                            },
                            *location,
                        ));
                    }
                    labels.insert(name.clone(), (position, location.line));
                }
                SourceLine::Instruction {
                    mnemonic,
                    operands,
                    location,
                } => {
                    position += select_opcode(*mnemonic, operands, *location)?.slots();
                }
            }
        }

        Ok(labels)
    }

    /// Pass 2: encode instructions into the flat stream
    fn encode(&self, labels: FxHashMap<String, (usize, usize)>) -> Result<Program, ParseError> {
        let mut code = Vec::new();
        let mut lines = FxHashMap::default();

        for line in &self.lines {
            let SourceLine::Instruction {
                mnemonic,
                operands,
                location,
            } = line
            else {
                continue;
            };

            let instruction = lower(*mnemonic, operands, *location, &labels)?;
            let start = code.len();
            instruction.encode(&mut code);
            debug_assert_eq!(code.len() - start, instruction.slots());
            lines.insert(start, location.line);
        }

        let labels = labels
            .into_iter()
            .map(|(name, (offset, _))| (name, offset))
            .collect();
        Ok(Program::new(code, labels, lines))
    }
}

/// Assemble source text in one call
pub fn assemble(source: &str) -> Result<Program, ParseError> {
    Assembler::new(source)?.assemble()
}

fn check_arity(
    mnemonic: Mnemonic,
    operands: &[Operand],
    min: usize,
    max: usize,
    location: SourceLocation,
) -> Result<(), ParseError> {
    let found = operands.len();
    if found < min {
        return Err(ParseError::new(
            ParseErrorKind::MissingOperand {
                mnemonic,
                expected: min,
                found,
            },
            location,
        ));
    }
    if found > max {
        return Err(ParseError::new(
            ParseErrorKind::UnexpectedOperand {
                mnemonic,
                expected: max,
                found,
            },
            location,
        ));
    }
    Ok(())
}

/// Pick the opcode a source line encodes to, validating its operands
pub fn select_opcode(
    mnemonic: Mnemonic,
    operands: &[Operand],
    location: SourceLocation,
) -> Result<Opcode, ParseError> {
    let error = |kind| Err(ParseError::new(kind, location));
    let unknown_register = |name: &String| {
        Err(ParseError::new(
            ParseErrorKind::UnknownRegister { name: name.clone() },
            location,
        ))
    };

    match mnemonic {
        Mnemonic::Push => {
            check_arity(mnemonic, operands, 1, 1, location)?;
            match &operands[0] {
                Operand::Register(_) => Ok(Opcode::PushReg),
                Operand::Immediate(_) => Ok(Opcode::Push),
                Operand::Symbol(name) => unknown_register(name),
            }
        }
        Mnemonic::Pop => {
            check_arity(mnemonic, operands, 0, 1, location)?;
            match operands.first() {
                None => Ok(Opcode::Pop),
                Some(Operand::Register(_)) => Ok(Opcode::PopReg),
                Some(Operand::Immediate(_)) => error(ParseErrorKind::ExpectedRegister { mnemonic }),
                Some(Operand::Symbol(name)) => unknown_register(name),
            }
        }
        Mnemonic::Dup => {
            check_arity(mnemonic, operands, 1, 1, location)?;
            match &operands[0] {
                Operand::Immediate(_) => Ok(Opcode::Dup),
                _ => error(ParseErrorKind::ExpectedImmediate { mnemonic }),
            }
        }
        Mnemonic::Mov => {
            check_arity(mnemonic, operands, 2, 2, location)?;
            match &operands[0] {
                Operand::Register(_) => {}
                Operand::Immediate(_) => {
                    return error(ParseErrorKind::ExpectedRegister { mnemonic })
                }
                Operand::Symbol(name) => return unknown_register(name),
            }
            match &operands[1] {
                Operand::Register(_) => Ok(Opcode::Mov),
                Operand::Immediate(_) => Ok(Opcode::MovImm),
                Operand::Symbol(name) => unknown_register(name),
            }
        }
        Mnemonic::Jmp | Mnemonic::Je | Mnemonic::Jne => {
            check_arity(mnemonic, operands, 1, 1, location)?;
            if !matches!(operands[0], Operand::Symbol(_)) {
                return error(ParseErrorKind::ExpectedLabel { mnemonic });
            }
            Ok(match mnemonic {
                Mnemonic::Jmp => Opcode::Jmp,
                Mnemonic::Je => Opcode::Je,
                _ => Opcode::Jne,
            })
        }
        Mnemonic::Swp => niladic(mnemonic, operands, location, Opcode::Swp),
        Mnemonic::In => niladic(mnemonic, operands, location, Opcode::In),
        Mnemonic::Out => niladic(mnemonic, operands, location, Opcode::Out),
        Mnemonic::Mul => niladic(mnemonic, operands, location, Opcode::Mul),
        Mnemonic::Add => niladic(mnemonic, operands, location, Opcode::Add),
        Mnemonic::Mod => niladic(mnemonic, operands, location, Opcode::Mod),
        Mnemonic::End => niladic(mnemonic, operands, location, Opcode::End),
        Mnemonic::Hlt => niladic(mnemonic, operands, location, Opcode::Hlt),
    }
}

fn niladic(
    mnemonic: Mnemonic,
    operands: &[Operand],
    location: SourceLocation,
    opcode: Opcode,
) -> Result<Opcode, ParseError> {
    check_arity(mnemonic, operands, 0, 0, location)?;
    Ok(opcode)
}

/// Build the typed instruction for a validated line
fn lower(
    mnemonic: Mnemonic,
    operands: &[Operand],
    location: SourceLocation,
    labels: &FxHashMap<String, (usize, usize)>,
) -> Result<Instruction, ParseError> {
    let opcode = select_opcode(mnemonic, operands, location)?;

    let register = |i: usize| match &operands[i] {
        Operand::Register(reg) => *reg,
        other => unreachable!("operand {:?} was validated as a register", other),
    };
    let immediate = |i: usize| match &operands[i] {
        Operand::Immediate(value) => *value,
        other => unreachable!("operand {:?} was validated as an immediate", other),
    };
    let target = || match &operands[0] {
        Operand::Symbol(name) => labels.get(name).map(|&(offset, _)| offset).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::UndefinedLabel { name: name.clone() },
                location,
            )
        }),
        other => unreachable!("operand {:?} was validated as a label", other),
    };

    let instruction = match opcode {
        Opcode::Push => Instruction::Push(immediate(0)),
        Opcode::PushReg => Instruction::PushReg(register(0)),
        Opcode::Pop => Instruction::Pop,
        Opcode::PopReg => Instruction::PopReg(register(0)),
        Opcode::Dup => Instruction::Dup(immediate(0)),
        Opcode::Swp => Instruction::Swp,
        Opcode::Mov => Instruction::Mov {
            dst: register(0),
            src: register(1),
        },
        Opcode::MovImm => Instruction::MovImm {
            dst: register(0),
            value: immediate(1),
        },
        Opcode::In => Instruction::In,
        Opcode::Out => Instruction::Out,
        Opcode::Mul => Instruction::Mul,
        Opcode::Add => Instruction::Add,
        Opcode::Mod => Instruction::Mod,
        Opcode::Jmp => Instruction::Jmp(target()?),
        Opcode::Je => Instruction::Je(target()?),
        Opcode::Jne => Instruction::Jne(target()?),
        Opcode::End => Instruction::End,
        Opcode::Hlt => Instruction::Hlt,
    };
    Ok(instruction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::isa::Register;

    #[test]
    fn test_encode_simple_program() {
        let program = assemble("push 1\npush 2\nadd\nout\nhlt").unwrap();
        assert_eq!(program.code(), &[0, 1, 0, 2, 11, 9, 17]);
        assert_eq!(program.source_line(4), Some(3));
    }

    #[test]
    fn test_register_variants() {
        let program = assemble("push RCX\npop RDX\npop\nmov RAX, RBX\nmov RBX 5").unwrap();
        assert_eq!(program.code(), &[1, 2, 3, 3, 2, 6, 0, 1, 7, 1, 5]);
    }

    #[test]
    fn test_forward_label_resolution() {
        let source = "\
            mov RAX, 1\n\
            push RAX\n\
            jmp skip\n\
            push 99\n\
            out\n\
            skip:\n\
            push 2\n\
            hlt";
        let program = assemble(source).unwrap();

        // mov(3) + push RAX(2) + jmp(2) + push(2) + out(1)
        assert_eq!(program.label("skip"), Some(10));
        assert_eq!(program.code()[6], 10);
        assert_eq!(program.decode(10), Ok(Instruction::Push(2)));
    }

    #[test]
    fn test_backward_and_trailing_labels() {
        let program = assemble("top:\npush 0\npush 0\nje done\njmp top\ndone:").unwrap();
        assert_eq!(program.label("top"), Some(0));
        assert_eq!(program.label("done"), Some(8));
        assert_eq!(program.len(), 8);
        assert_eq!(
            program.disassemble().unwrap().last(),
            Some(&(6, Instruction::Jmp(0)))
        );
    }

    #[test]
    fn test_operand_errors() {
        let cases = [
            ("push", "MissingOperand"),
            ("add 3", "UnexpectedOperand"),
            ("pop RAX RBX", "UnexpectedOperand"),
            ("push REX", "UnknownRegister"),
            ("mov 1, RAX", "ExpectedRegister"),
            ("mov RAX", "MissingOperand"),
            ("mov RAX, REX", "UnknownRegister"),
            ("dup RAX", "ExpectedImmediate"),
            ("jmp 4", "ExpectedLabel"),
            ("jne nowhere", "UndefinedLabel"),
            ("pop 3", "ExpectedRegister"),
        ];
        for (source, expected) in cases {
            let err = assemble(source).unwrap_err();
            let kind = format!("{:?}", err.kind);
            assert!(
                kind.starts_with(expected),
                "{:?} produced {:?}, expected {}",
                source,
                err.kind,
                expected
            );
        }
    }

    #[test]
    fn test_duplicate_label() {
        let err = assemble("a:\npush 1\na:").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::DuplicateLabel {
                name: "a".to_string(),
                first_line: 1
            }
        );
        assert_eq!(err.location.line, 3);
    }

    #[test]
    fn test_select_opcode_is_shared_width_source() {
        let loc = SourceLocation::new(1, 1);
        let reg = [Operand::Register(Register::Rax)];
        assert_eq!(select_opcode(Mnemonic::Pop, &[], loc).unwrap().slots(), 1);
        assert_eq!(select_opcode(Mnemonic::Pop, &reg, loc).unwrap().slots(), 2);
        let mov = [Operand::Register(Register::Rax), Operand::Immediate(3)];
        assert_eq!(select_opcode(Mnemonic::Mov, &mov, loc).unwrap(), Opcode::MovImm);
    }
}
