//! Assembly-time error types
//!
//! Every [`ParseError`] is fatal: the assembler stops at the first one and no
//! program is produced, so a malformed source is never partially executed.

use super::isa::Mnemonic;
use super::lexer::SourceLocation;
use std::fmt;

/// What went wrong while assembling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// First token is neither a mnemonic nor a label definition
    UnknownMnemonic { name: String },

    /// Too few operands for the mnemonic
    MissingOperand {
        mnemonic: Mnemonic,
        expected: usize,
        found: usize,
    },

    /// Too many operands for the mnemonic
    UnexpectedOperand {
        mnemonic: Mnemonic,
        expected: usize,
        found: usize,
    },

    /// A register position names something that is not a register
    UnknownRegister { name: String },

    /// An immediate appears where only a register is accepted
    ExpectedRegister { mnemonic: Mnemonic },

    /// A register or label appears where only an integer is accepted
    ExpectedImmediate { mnemonic: Mnemonic },

    /// A jump operand that is not a label name
    ExpectedLabel { mnemonic: Mnemonic },

    /// Jump to a label that is never defined
    UndefinedLabel { name: String },

    /// Label defined twice
    DuplicateLabel { name: String, first_line: usize },

    /// Label definition with an unusable name
    InvalidLabel { name: String },

    /// Numeric-looking operand that does not fit an `i32`
    InvalidInteger { text: String },

    /// Operand that is neither register, integer, nor identifier
    InvalidOperand { text: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnknownMnemonic { name } => {
                write!(f, "unknown command '{}'", name)
            }
            ParseErrorKind::MissingOperand {
                mnemonic,
                expected,
                found,
            } => write!(
                f,
                "'{}' expects {} operand{}, found {}",
                mnemonic,
                expected,
                if *expected == 1 { "" } else { "s" },
                found
            ),
            ParseErrorKind::UnexpectedOperand {
                mnemonic,
                expected,
                found,
            } => write!(
                f,
                "'{}' takes at most {} operand{}, found {}",
                mnemonic,
                expected,
                if *expected == 1 { "" } else { "s" },
                found
            ),
            ParseErrorKind::UnknownRegister { name } => {
                write!(f, "unknown register '{}'", name)
            }
            ParseErrorKind::ExpectedRegister { mnemonic } => {
                write!(f, "'{}' expects a register operand", mnemonic)
            }
            ParseErrorKind::ExpectedImmediate { mnemonic } => {
                write!(f, "'{}' expects an integer operand", mnemonic)
            }
            ParseErrorKind::ExpectedLabel { mnemonic } => {
                write!(f, "'{}' expects a label operand", mnemonic)
            }
            ParseErrorKind::UndefinedLabel { name } => {
                write!(f, "undefined label '{}'", name)
            }
            ParseErrorKind::DuplicateLabel { name, first_line } => {
                write!(
                    f,
                    "label '{}' already defined at line {}",
                    name, first_line
                )
            }
            ParseErrorKind::InvalidLabel { name } => {
                write!(f, "invalid label name '{}'", name)
            }
            ParseErrorKind::InvalidInteger { text } => {
                write!(f, "invalid integer '{}'", text)
            }
            ParseErrorKind::InvalidOperand { text } => {
                write!(f, "invalid operand '{}'", text)
            }
        }
    }
}

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: SourceLocation,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, location: SourceLocation) -> Self {
        ParseError { kind, location }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.kind
        )
    }
}

impl std::error::Error for ParseError {}
