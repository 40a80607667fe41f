use crate::interpreter::engine::{ControlFlow, Processor};
use crate::interpreter::errors::RuntimeError;
use crate::parser::isa::Opcode;
use std::io::Write;

impl<W: Write> Processor<W> {
    /// `je` / `jne`: pop two values and jump when their equality matches `on_equal`
    pub(crate) fn execute_branch(
        &mut self,
        opcode: Opcode,
        target: usize,
        on_equal: bool,
        offset: usize,
    ) -> Result<ControlFlow, RuntimeError> {
        let [first, second] = self.pop_operands::<2>(opcode, offset)?;
        if (first == second) == on_equal {
            Ok(ControlFlow::Jump(target))
        } else {
            Ok(ControlFlow::Next)
        }
    }
}
