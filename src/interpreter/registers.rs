//! General-purpose register file

use crate::parser::isa::{Register, REGISTER_COUNT};

/// The four register slots, independent of the stack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterFile {
    values: [i32; REGISTER_COUNT],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, register: Register) -> i32 {
        self.values[register.index()]
    }

    pub fn set(&mut self, register: Register, value: i32) {
        self.values[register.index()] = value;
    }

    /// Register/value pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (Register, i32)> + '_ {
        Register::ALL.iter().map(move |&reg| (reg, self.get(reg)))
    }
}
