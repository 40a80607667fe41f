// Processor behavior driven through the public API

use stackvm::interpreter::{ExitReason, Processor, RuntimeError, StepOutcome};
use stackvm::parser::isa::{Opcode, Register};
use stackvm::parser::program::DecodeError;
use stackvm::parser::{assemble, Program};
use std::io::Cursor;

fn run(source: &str, input: &'static str) -> (Result<ExitReason, RuntimeError>, String) {
    let program = assemble(source).expect("Assembly failed");
    let mut processor = Processor::new(program, Vec::new()).with_input(Cursor::new(input));
    let result = processor.run();
    (result, String::from_utf8_lossy(processor.output()).into_owned())
}

#[test]
fn test_inline_scenarios() {
    let cases = [
        ("push 1\npush 2\nadd\nout\nhlt", "3\n"),
        ("push 5\npush 6\nmul\nout\nhlt", "30\n"),
        ("mov RAX, 5\nmov RBX, RAX\npush RBX\nout\nhlt", "5\n"),
        ("push 1\npush 2\npop\nout\nhlt", "1\n"),
    ];
    for (source, expected) in cases {
        let (result, output) = run(source, "");
        assert_eq!(result, Ok(ExitReason::Halted), "{}", source);
        assert_eq!(output, expected, "{}", source);
    }
}

#[test]
fn test_mod_operand_order() {
    // second % first: 17 was pushed first
    let (_, output) = run("push 17\npush 5\nmod\nout\nhlt", "");
    assert_eq!(output, "2\n");
}

#[test]
fn test_forward_jump_skips_code() {
    let source = "jmp skip\npush 1\nout\nskip:\npush 2\nout\nhlt";
    let program = assemble(source).unwrap();
    assert_eq!(program.label("skip"), Some(5));

    let (result, output) = run(source, "");
    assert_eq!(result, Ok(ExitReason::Halted));
    assert_eq!(output, "2\n");
}

#[test]
fn test_jne_loop() {
    let source = "
        mov RAX, 0
        again:
        push RAX
        push 1
        add
        pop RAX
        push RAX
        push 4
        jne again
        push RAX
        out
        end
    ";
    assert_eq!(run(source, ""), (Ok(ExitReason::Ended), "4\n".to_string()));
}

#[test]
fn test_hlt_stops_immediately() {
    let (result, output) = run("push 1\nout\nhlt\npush 2\nout", "");
    assert_eq!(result, Ok(ExitReason::Halted));
    assert_eq!(output, "1\n");
}

#[test]
fn test_running_off_the_end() {
    let (result, output) = run("push 9\nout", "");
    assert_eq!(result, Ok(ExitReason::RanOffEnd));
    assert_eq!(output, "9\n");
}

#[test]
fn test_underflow_faults_keep_flushed_output() {
    let (result, output) = run("push 1\nout\nadd\nhlt", "");
    match result {
        Err(RuntimeError::StackUnderflow {
            opcode,
            needed,
            available,
            offset,
        }) => {
            assert_eq!(opcode, Opcode::Add);
            assert_eq!(needed, 2);
            assert_eq!(available, 0);
            assert_eq!(offset, 3);
        }
        other => panic!("Expected underflow, got {:?}", other),
    }
    assert_eq!(output, "1\n");
}

#[test]
fn test_underflow_on_every_popping_opcode() {
    for source in ["pop", "pop RAX", "swp", "dup 1", "out", "mul", "mod", "je x\nx:"] {
        let (result, _) = run(source, "");
        assert!(
            matches!(result, Err(RuntimeError::StackUnderflow { .. })),
            "{} gave {:?}",
            source,
            result
        );
    }
}

#[test]
fn test_input_faults() {
    let program = assemble("in\nhlt").unwrap();
    let mut processor = Processor::new(program, Vec::new());
    assert_eq!(
        processor.run(),
        Err(RuntimeError::InputNotBound { offset: 0 })
    );

    let (result, _) = run("in\nin\nhlt", "7");
    assert_eq!(result, Err(RuntimeError::InputExhausted { offset: 1 }));

    let (result, _) = run("in\nhlt", "seven");
    assert!(matches!(result, Err(RuntimeError::InvalidInput { ref token, .. }) if token == "seven"));
}

#[test]
fn test_modulo_by_zero() {
    let (result, _) = run("push 3\npush 0\nmod\nhlt", "");
    assert_eq!(result, Err(RuntimeError::DivisionByZero { offset: 4 }));
}

#[test]
fn test_arithmetic_wraps() {
    let (_, output) = run("push 2147483647\npush 1\nadd\nout\nhlt", "");
    assert_eq!(output, "-2147483648\n");
}

#[test]
fn test_dup_with_non_positive_count_drops_pair() {
    let program = assemble("push 1\npush 2\ndup 0\nhlt").unwrap();
    let mut processor = Processor::new(program, Vec::new());
    processor.run().unwrap();
    assert_eq!(processor.stack_contents().unwrap(), Vec::<i32>::new());
}

#[test]
fn test_stepping_and_observers() {
    let program = assemble("mov RCX, 3\npush RCX\npush 4\nhlt").unwrap();
    let mut processor = Processor::new(program, Vec::new());

    assert_eq!(processor.step(), Ok(StepOutcome::Continue));
    assert_eq!(processor.ip(), 3);
    assert_eq!(processor.registers().get(Register::Rcx), 3);

    processor.step().unwrap();
    processor.step().unwrap();
    assert_eq!(processor.stack_contents().unwrap(), vec![3, 4]);
    assert_eq!(processor.steps(), 3);

    assert_eq!(
        processor.step(),
        Ok(StepOutcome::Finished(ExitReason::Halted))
    );
    assert_eq!(processor.exit_reason(), Some(ExitReason::Halted));
    // Finished processors stay finished
    assert_eq!(
        processor.step(),
        Ok(StepOutcome::Finished(ExitReason::Halted))
    );
    assert_eq!(processor.steps(), 4);
}

#[test]
fn test_stack_grows_past_initial_capacity() {
    let mut source = String::new();
    for i in 0..100 {
        source.push_str(&format!("push {}\n", i));
    }
    source.push_str("hlt\n");

    let program = assemble(&source).unwrap();
    let mut processor = Processor::new(program, Vec::new());
    processor.run().unwrap();

    assert_eq!(processor.stack_contents().unwrap(), (0..100).collect::<Vec<_>>());
    assert!(processor.stack_capacity().unwrap() >= 100);
}

#[test]
fn test_raw_stream_decode_faults() {
    let mut processor = Processor::new(Program::from_raw(vec![99]), Vec::new());
    assert_eq!(
        processor.run(),
        Err(RuntimeError::Decode(DecodeError::InvalidOpcode {
            offset: 0,
            value: 99
        }))
    );

    // push with its operand missing
    let mut processor = Processor::new(Program::from_raw(vec![0]), Vec::new());
    assert!(matches!(
        processor.run(),
        Err(RuntimeError::Decode(DecodeError::Truncated { .. }))
    ));

    // jmp far outside the stream
    let mut processor = Processor::new(Program::from_raw(vec![13, 500]), Vec::new());
    let err = processor.run().unwrap_err();
    assert_eq!(err.offset(), 0);
    assert!(err.stack_fault().is_none());
}

#[test]
fn test_raw_stream_runs() {
    // push 20; push 22; add; out; end
    let program = Program::from_raw(vec![0, 20, 0, 22, 11, 9, 16]);
    let mut processor = Processor::new(program, Vec::new());
    assert_eq!(processor.run(), Ok(ExitReason::Ended));
    assert_eq!(processor.into_output(), b"42\n");
}

#[test]
fn test_runtime_error_messages() {
    let (result, _) = run("pop", "");
    let err = result.unwrap_err();
    assert!(err.stack_fault().is_none());
    assert!(err.to_string().starts_with("Stack underflow at offset 0"));
}
