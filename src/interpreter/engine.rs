// Execution engine for the processor

use crate::interpreter::errors::RuntimeError;
use crate::interpreter::io::InputStream;
use crate::interpreter::registers::RegisterFile;
use crate::memory::fault::StackFault;
use crate::memory::stack::GuardedStack;
use crate::parser::program::{Instruction, Program};
use std::io::{BufRead, Write};

/// Why a program stopped without faulting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Executed `hlt`
    Halted,
    /// Executed `end`
    Ended,
    /// Instruction pointer moved past the last instruction
    RanOffEnd,
}

/// Result of executing a single instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Finished(ExitReason),
}

/// Where the instruction pointer goes after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlFlow {
    Next,
    Jump(usize),
    Stop(ExitReason),
}

/// A stack machine executing one assembled program
pub struct Processor<W: Write> {
    /// Encoded program
    program: Program,

    /// Operand stack
    pub(crate) stack: GuardedStack<i32>,

    /// General-purpose registers
    pub(crate) registers: RegisterFile,

    /// Offset of the next instruction to execute
    ip: usize,

    /// Stream feeding `in`, if bound
    pub(crate) input: Option<InputStream>,

    /// Stream receiving `out`
    pub(crate) output: W,

    /// Instructions executed so far
    steps: usize,

    /// Set once the program has stopped normally
    finished: Option<ExitReason>,
}

impl<W: Write> Processor<W> {
    /// Create a processor with no input stream bound
    pub fn new(program: Program, output: W) -> Self {
        Processor {
            program,
            stack: GuardedStack::new(),
            registers: RegisterFile::new(),
            ip: 0,
            input: None,
            output,
            steps: 0,
            finished: None,
        }
    }

    /// Bind the stream `in` reads from
    pub fn with_input<R: BufRead + 'static>(mut self, reader: R) -> Self {
        self.input = Some(InputStream::new(reader));
        self
    }

    /// Run until the program stops or faults
    pub fn run(&mut self) -> Result<ExitReason, RuntimeError> {
        loop {
            if let StepOutcome::Finished(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    /// Fetch, decode and execute one instruction
    pub fn step(&mut self) -> Result<StepOutcome, RuntimeError> {
        if let Some(reason) = self.finished {
            return Ok(StepOutcome::Finished(reason));
        }
        if self.ip >= self.program.len() {
            return Ok(self.finish(ExitReason::RanOffEnd));
        }

        let offset = self.ip;
        let instruction = self.program.decode(offset)?;
        self.steps += 1;

        match self.execute(instruction, offset)? {
            ControlFlow::Next => {
                self.ip = offset + instruction.slots();
                Ok(StepOutcome::Continue)
            }
            ControlFlow::Jump(target) => {
                self.ip = target;
                Ok(StepOutcome::Continue)
            }
            ControlFlow::Stop(reason) => Ok(self.finish(reason)),
        }
    }

    fn finish(&mut self, reason: ExitReason) -> StepOutcome {
        self.finished = Some(reason);
        StepOutcome::Finished(reason)
    }

    fn execute(
        &mut self,
        instruction: Instruction,
        offset: usize,
    ) -> Result<ControlFlow, RuntimeError> {
        let opcode = instruction.opcode();
        match instruction {
            Instruction::Push(value) => self.push_value(value, offset)?,
            Instruction::PushReg(reg) => self.push_value(self.registers.get(reg), offset)?,
            Instruction::Pop => {
                self.pop_operands::<1>(opcode, offset)?;
            }
            Instruction::PopReg(reg) => {
                let [value] = self.pop_operands::<1>(opcode, offset)?;
                self.registers.set(reg, value);
            }
            Instruction::Dup(count) => self.execute_duplicate(count, offset)?,
            Instruction::Swp => self.execute_swap(offset)?,
            Instruction::Mov { dst, src } => {
                let value = self.registers.get(src);
                self.registers.set(dst, value);
            }
            Instruction::MovImm { dst, value } => self.registers.set(dst, value),
            Instruction::In => self.execute_input(offset)?,
            Instruction::Out => self.execute_output(offset)?,
            Instruction::Mul | Instruction::Add | Instruction::Mod => {
                self.execute_arithmetic(opcode, offset)?
            }
            Instruction::Jmp(target) => return Ok(ControlFlow::Jump(target)),
            Instruction::Je(target) => return self.execute_branch(opcode, target, true, offset),
            Instruction::Jne(target) => {
                return self.execute_branch(opcode, target, false, offset)
            }
            Instruction::End => return Ok(ControlFlow::Stop(ExitReason::Ended)),
            Instruction::Hlt => return Ok(ControlFlow::Stop(ExitReason::Halted)),
        }
        Ok(ControlFlow::Next)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Offset of the next instruction
    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Live stack values, bottom first. Runs the latching self-check, so a
    /// corrupted stack is released on the first call.
    pub fn stack_contents(&mut self) -> Result<Vec<i32>, StackFault> {
        self.stack.check()?;
        self.stack.contents()
    }

    pub fn stack_capacity(&mut self) -> Result<usize, StackFault> {
        self.stack.check()?;
        self.stack.capacity()
    }

    /// Number of instructions executed
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.finished
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::fault::FaultKind;
    use crate::parser::assemble;

    #[test]
    fn test_corruption_stops_execution_with_dump() {
        let program = assemble("push 1\npush 2\nadd\nout\nhlt").unwrap();
        let mut processor = Processor::new(program, Vec::new());
        processor.step().unwrap();
        processor.step().unwrap();

        processor.stack.scribble(0, 99);
        let err = processor.run().unwrap_err();

        assert_eq!(err.offset(), 4);
        let fault = err.stack_fault().expect("corruption carries a dump");
        assert_eq!(fault.kind, FaultKind::DataChecksum);
        assert_eq!(fault.dump.size, 4);
        assert!(processor.output().is_empty());

        // The stack stays failed for any later observer
        assert_eq!(processor.stack_contents().unwrap_err(), *fault);
    }

    #[test]
    fn test_reserved_slot_write_is_caught_on_push() {
        let program = assemble("push 1\npush 2\nhlt").unwrap();
        let mut processor = Processor::new(program, Vec::new());
        processor.step().unwrap();

        processor.stack.scribble(3, 0);
        assert!(matches!(
            processor.step(),
            Err(RuntimeError::StackCorrupted { offset: 2, .. })
        ));
    }

    #[test]
    fn test_stack_observers_latch_corruption() {
        let program = assemble("push 1\npush 2\nhlt").unwrap();
        let mut processor = Processor::new(program, Vec::new());
        processor.step().unwrap();
        processor.step().unwrap();

        processor.stack.scribble(1, 7);
        let first = processor.stack_contents().unwrap_err();
        assert_eq!(first.kind, FaultKind::DataChecksum);
        assert!(processor.stack.is_failed());

        // Repeated observation reports the same latched fault
        assert_eq!(processor.stack_contents().unwrap_err(), first);
        assert_eq!(processor.stack_capacity().unwrap_err(), first);
    }
}
