// Execution history for stepping a program forward and backward

use crate::interpreter::constants::{TRACE_MEMORY_LIMIT, TRACE_STEP_LIMIT};
use crate::interpreter::engine::{ExitReason, Processor, StepOutcome};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::registers::RegisterFile;
use crate::parser::program::Program;
use std::fmt;
use std::io::{self, BufRead, Write};

/// Mock terminal capturing everything `out` writes
#[derive(Debug, Clone, Default)]
pub struct MockTerminal {
    pub lines: Vec<String>,
    /// Text written after the last newline
    partial: String,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, including an unterminated trailing one
    pub fn get_output(&self) -> Vec<String> {
        let mut output = self.lines.clone();
        if !self.partial.is_empty() {
            output.push(self.partial.clone());
        }
        output
    }

    fn estimated_size(&self) -> usize {
        self.lines.iter().map(|l| l.len() + 24).sum::<usize>() + self.partial.len()
    }
}

impl Write for MockTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for chunk in String::from_utf8_lossy(buf).split_inclusive('\n') {
            match chunk.strip_suffix('\n') {
                Some(line) => {
                    self.partial.push_str(line);
                    self.lines.push(std::mem::take(&mut self.partial));
                }
                None => self.partial.push_str(chunk),
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Processor state between two instructions
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Instructions executed before this point
    pub step: usize,
    /// Offset of the next instruction
    pub ip: usize,
    /// Source line of the next instruction, if it is inside the program
    pub source_line: Option<usize>,
    pub registers: RegisterFile,
    /// Live stack values, bottom first
    pub stack: Vec<i32>,
    pub capacity: usize,
    pub terminal: MockTerminal,
}

impl Snapshot {
    fn capture(processor: &mut Processor<MockTerminal>) -> Self {
        let ip = processor.ip();
        Snapshot {
            step: processor.steps(),
            ip,
            source_line: processor.program().source_line(ip),
            registers: *processor.registers(),
            stack: processor.stack_contents().unwrap_or_default(),
            capacity: processor.stack_capacity().unwrap_or_default(),
            terminal: processor.output().clone(),
        }
    }

    /// Rough memory footprint in bytes
    pub fn estimated_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.stack.len() * std::mem::size_of::<i32>()
            + self.terminal.estimated_size()
    }
}

/// Bounded snapshot history
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot, refusing it once the memory limit would be exceeded
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), String> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(format!(
                "snapshot memory limit exceeded: {} + {} > {}",
                self.current_memory, snapshot_size, self.max_memory
            ));
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}

/// How a recorded run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceOutcome {
    Finished(ExitReason),
    Faulted(RuntimeError),
    /// Recording stopped early; the program had not finished
    Truncated(String),
}

impl fmt::Display for TraceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceOutcome::Finished(ExitReason::Halted) => write!(f, "halted"),
            TraceOutcome::Finished(ExitReason::Ended) => write!(f, "reached end"),
            TraceOutcome::Finished(ExitReason::RanOffEnd) => {
                write!(f, "ran past the last instruction")
            }
            TraceOutcome::Faulted(err) => write!(f, "{}", err),
            TraceOutcome::Truncated(reason) => write!(f, "truncated: {}", reason),
        }
    }
}

/// Attempted to move past either end of the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEdge {
    Start,
    End,
}

impl fmt::Display for HistoryEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryEdge::Start => write!(f, "already at the beginning of execution"),
            HistoryEdge::End => write!(f, "no more snapshots (execution finished)"),
        }
    }
}

/// A fully recorded run with a cursor into its history
#[derive(Debug)]
pub struct Trace {
    history: SnapshotManager,
    position: usize,
    outcome: TraceOutcome,
}

impl Trace {
    /// Run `program` to completion, capturing state before the first
    /// instruction and after every executed one
    pub fn record<R: BufRead + 'static>(program: Program, input: R) -> Self {
        Self::record_with_limits(program, input, TRACE_MEMORY_LIMIT, TRACE_STEP_LIMIT)
    }

    pub fn record_with_limits<R: BufRead + 'static>(
        program: Program,
        input: R,
        memory_limit: usize,
        step_limit: usize,
    ) -> Self {
        let mut processor = Processor::new(program, MockTerminal::new()).with_input(input);
        let mut history = SnapshotManager::new(memory_limit);

        let outcome = match history.push(Snapshot::capture(&mut processor)) {
            Err(reason) => TraceOutcome::Truncated(reason),
            Ok(()) => loop {
                if processor.steps() >= step_limit {
                    break TraceOutcome::Truncated(format!("step limit of {} reached", step_limit));
                }
                match processor.step() {
                    Ok(StepOutcome::Continue) => {
                        if let Err(reason) = history.push(Snapshot::capture(&mut processor)) {
                            break TraceOutcome::Truncated(reason);
                        }
                    }
                    Ok(StepOutcome::Finished(reason)) => break TraceOutcome::Finished(reason),
                    Err(err) => break TraceOutcome::Faulted(err),
                }
            },
        };

        Trace {
            history,
            position: 0,
            outcome,
        }
    }

    pub fn outcome(&self) -> &TraceOutcome {
        &self.outcome
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> Option<&Snapshot> {
        self.history.get(self.position)
    }

    /// Snapshot at an arbitrary history index
    pub fn snapshot(&self, index: usize) -> Option<&Snapshot> {
        self.history.get(index)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Whether the cursor sits on the last recorded snapshot
    pub fn at_end(&self) -> bool {
        self.position + 1 >= self.history.len()
    }

    pub fn step_forward(&mut self) -> Result<(), HistoryEdge> {
        if self.at_end() {
            return Err(HistoryEdge::End);
        }
        self.position += 1;
        Ok(())
    }

    pub fn step_backward(&mut self) -> Result<(), HistoryEdge> {
        if self.position == 0 {
            return Err(HistoryEdge::Start);
        }
        self.position -= 1;
        Ok(())
    }

    pub fn rewind_to_start(&mut self) {
        self.position = 0;
    }

    pub fn jump_to_end(&mut self) {
        self.position = self.history.len().saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble;
    use std::io::Cursor;

    #[test]
    fn test_mock_terminal_splits_lines() {
        let mut term = MockTerminal::new();
        write!(term, "12\n3").unwrap();
        writeln!(term, "4").unwrap();
        assert_eq!(term.lines, vec!["12", "34"]);
        write!(term, "tail").unwrap();
        assert_eq!(term.get_output(), vec!["12", "34", "tail"]);
    }

    #[test]
    fn test_record_sum() {
        let program = assemble("push 1\npush 2\nadd\nout\nhlt\n").unwrap();
        let trace = Trace::record(program, io::empty());

        assert_eq!(trace.outcome(), &TraceOutcome::Finished(ExitReason::Halted));
        // initial state + four non-terminating instructions
        assert_eq!(trace.len(), 5);

        let first = trace.current().unwrap();
        assert_eq!(first.step, 0);
        assert_eq!(first.ip, 0);
        assert_eq!(first.source_line, Some(1));
        assert!(first.stack.is_empty());
    }

    #[test]
    fn test_navigation() {
        let program = assemble("push 1\npush 2\nadd\nout\nhlt\n").unwrap();
        let mut trace = Trace::record(program, io::empty());

        assert_eq!(trace.step_backward(), Err(HistoryEdge::Start));
        trace.step_forward().unwrap();
        trace.step_forward().unwrap();
        assert_eq!(trace.current().unwrap().stack, vec![1, 2]);

        trace.step_forward().unwrap();
        assert_eq!(trace.current().unwrap().stack, vec![3]);

        trace.jump_to_end();
        assert!(trace.at_end());
        assert_eq!(trace.step_forward(), Err(HistoryEdge::End));
        let last = trace.current().unwrap();
        assert!(last.stack.is_empty());
        assert_eq!(last.terminal.get_output(), vec!["3"]);

        trace.step_backward().unwrap();
        assert_eq!(trace.current().unwrap().stack, vec![3]);
        assert!(trace.current().unwrap().terminal.lines.is_empty());

        trace.rewind_to_start();
        assert_eq!(trace.position(), 0);
    }

    #[test]
    fn test_record_reads_input() {
        let program = assemble("in\nin\nmul\nout\nend\n").unwrap();
        let trace = Trace::record(program, Cursor::new("6 7"));
        assert_eq!(trace.outcome(), &TraceOutcome::Finished(ExitReason::Ended));
        assert_eq!(trace.current().map(|s| s.ip), Some(0));
    }

    #[test]
    fn test_record_keeps_history_before_fault() {
        let program = assemble("push 5\nadd\n").unwrap();
        let trace = Trace::record(program, io::empty());
        assert!(matches!(
            trace.outcome(),
            TraceOutcome::Faulted(RuntimeError::StackUnderflow { .. })
        ));
        assert_eq!(trace.len(), 2);
    }

    #[test]
    fn test_step_limit_truncates() {
        let program = assemble("top:\njmp top\n").unwrap();
        let trace = Trace::record_with_limits(program, io::empty(), TRACE_MEMORY_LIMIT, 10);
        assert!(matches!(trace.outcome(), TraceOutcome::Truncated(_)));
        assert_eq!(trace.len(), 11);
    }

    #[test]
    fn test_memory_limit_truncates() {
        let program = assemble("push 1\npush 2\npush 3\nhlt\n").unwrap();
        let trace = Trace::record_with_limits(program, io::empty(), 1, TRACE_STEP_LIMIT);
        assert!(matches!(trace.outcome(), TraceOutcome::Truncated(_)));
        assert!(trace.is_empty());
        assert!(trace.current().is_none());
    }
}
