//! Instruction set definition
//!
//! Mnemonics are what the source text names; opcodes are what the encoded
//! stream holds. One mnemonic can map to several opcodes (`push` becomes
//! `Push` or `PushReg` depending on its operand), so the assembler first
//! selects an [`Opcode`] for each line and then asks it how many slots it
//! occupies. [`Opcode::slots`] is the only slot-count table in the crate.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::LazyLock;

/// Number of general-purpose registers
pub const REGISTER_COUNT: usize = 4;

/// Character terminating a label definition
pub const LABEL_TERMINATOR: char = ':';

/// Character starting a line comment
pub const COMMENT_START: char = ';';

/// Source-level instruction names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Push,
    Pop,
    Dup,
    Swp,
    Mov,
    In,
    Out,
    Mul,
    Add,
    Mod,
    Jmp,
    Je,
    Jne,
    End,
    Hlt,
}

impl Mnemonic {
    pub fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Push => "push",
            Mnemonic::Pop => "pop",
            Mnemonic::Dup => "dup",
            Mnemonic::Swp => "swp",
            Mnemonic::Mov => "mov",
            Mnemonic::In => "in",
            Mnemonic::Out => "out",
            Mnemonic::Mul => "mul",
            Mnemonic::Add => "add",
            Mnemonic::Mod => "mod",
            Mnemonic::Jmp => "jmp",
            Mnemonic::Je => "je",
            Mnemonic::Jne => "jne",
            Mnemonic::End => "end",
            Mnemonic::Hlt => "hlt",
        }
    }

    pub fn lookup(text: &str) -> Option<Mnemonic> {
        MNEMONICS.get(text).copied()
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// General-purpose register names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Rax = 0,
    Rbx = 1,
    Rcx = 2,
    Rdx = 3,
}

impl Register {
    pub const ALL: [Register; REGISTER_COUNT] =
        [Register::Rax, Register::Rbx, Register::Rcx, Register::Rdx];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: i32) -> Option<Register> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Register::ALL.get(i).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::Rax => "RAX",
            Register::Rbx => "RBX",
            Register::Rcx => "RCX",
            Register::Rdx => "RDX",
        }
    }

    pub fn lookup(text: &str) -> Option<Register> {
        REGISTERS.get(text).copied()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoded instruction identifiers, as stored in the program stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Push = 0,
    PushReg = 1,
    Pop = 2,
    PopReg = 3,
    Dup = 4,
    Swp = 5,
    Mov = 6,
    MovImm = 7,
    In = 8,
    Out = 9,
    Mul = 10,
    Add = 11,
    Mod = 12,
    Jmp = 13,
    Je = 14,
    Jne = 15,
    End = 16,
    Hlt = 17,
}

impl Opcode {
    pub const ALL: [Opcode; 18] = [
        Opcode::Push,
        Opcode::PushReg,
        Opcode::Pop,
        Opcode::PopReg,
        Opcode::Dup,
        Opcode::Swp,
        Opcode::Mov,
        Opcode::MovImm,
        Opcode::In,
        Opcode::Out,
        Opcode::Mul,
        Opcode::Add,
        Opcode::Mod,
        Opcode::Jmp,
        Opcode::Je,
        Opcode::Jne,
        Opcode::End,
        Opcode::Hlt,
    ];

    /// Stream slots taken by this opcode, itself included
    pub const fn slots(self) -> usize {
        match self {
            Opcode::Pop
            | Opcode::Swp
            | Opcode::In
            | Opcode::Out
            | Opcode::Mul
            | Opcode::Add
            | Opcode::Mod
            | Opcode::End
            | Opcode::Hlt => 1,
            Opcode::Push
            | Opcode::PushReg
            | Opcode::PopReg
            | Opcode::Dup
            | Opcode::Jmp
            | Opcode::Je
            | Opcode::Jne => 2,
            Opcode::Mov | Opcode::MovImm => 3,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Opcode> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Opcode::ALL.get(i).copied())
    }

    /// The source mnemonic this opcode is written with
    pub fn mnemonic(self) -> Mnemonic {
        match self {
            Opcode::Push | Opcode::PushReg => Mnemonic::Push,
            Opcode::Pop | Opcode::PopReg => Mnemonic::Pop,
            Opcode::Dup => Mnemonic::Dup,
            Opcode::Swp => Mnemonic::Swp,
            Opcode::Mov | Opcode::MovImm => Mnemonic::Mov,
            Opcode::In => Mnemonic::In,
            Opcode::Out => Mnemonic::Out,
            Opcode::Mul => Mnemonic::Mul,
            Opcode::Add => Mnemonic::Add,
            Opcode::Mod => Mnemonic::Mod,
            Opcode::Jmp => Mnemonic::Jmp,
            Opcode::Je => Mnemonic::Je,
            Opcode::Jne => Mnemonic::Jne,
            Opcode::End => Mnemonic::End,
            Opcode::Hlt => Mnemonic::Hlt,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic().as_str())
    }
}

static MNEMONICS: LazyLock<FxHashMap<&'static str, Mnemonic>> = LazyLock::new(|| {
    [
        Mnemonic::Push,
        Mnemonic::Pop,
        Mnemonic::Dup,
        Mnemonic::Swp,
        Mnemonic::Mov,
        Mnemonic::In,
        Mnemonic::Out,
        Mnemonic::Mul,
        Mnemonic::Add,
        Mnemonic::Mod,
        Mnemonic::Jmp,
        Mnemonic::Je,
        Mnemonic::Jne,
        Mnemonic::End,
        Mnemonic::Hlt,
    ]
    .into_iter()
    .map(|m| (m.as_str(), m))
    .collect()
});

static REGISTERS: LazyLock<FxHashMap<&'static str, Register>> =
    LazyLock::new(|| Register::ALL.into_iter().map(|r| (r.name(), r)).collect());
