//! Assembly source parser
//!
//! This module turns line-oriented assembly text into an encoded [`program::Program`]:
//! - [`isa`]: mnemonics, registers, opcodes and the slot-width table
//! - [`lexer`]: line classification (label, instruction, operands)
//! - [`assembler`]: label discovery and encoding passes
//! - [`program`]: the encoded stream, label table and typed decoder
//! - [`errors`]: parse error types
//!
//! # Source format
//!
//! ```text
//! ; comment
//! loop:            ; label definition, alone on its line
//!     push RAX     ; push <int> | push <REG>
//!     mov RBX, 5   ; mov <REG>, <REG-or-int>
//!     jne loop
//!     hlt
//! ```

pub mod assembler;
pub mod errors;
pub mod isa;
pub mod lexer;
pub mod program;

pub use assembler::{assemble, Assembler};
pub use errors::{ParseError, ParseErrorKind};
pub use program::{Instruction, Program};
