// Sample programs under programs/, run end to end

use stackvm::interpreter::{ExitReason, Processor};
use stackvm::parser::assemble;
use std::fs;
use std::io::Cursor;
use std::path::Path;

fn run_file(name: &str, input: &'static str) -> (ExitReason, String) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("programs")
        .join(name);
    let source = fs::read_to_string(&path).expect("Failed to read program");
    let program = assemble(&source).expect("Assembly failed");

    let mut processor = Processor::new(program, Vec::new()).with_input(Cursor::new(input));
    let reason = processor.run().expect("Execution failed");
    let output = String::from_utf8(processor.into_output()).expect("Output is not UTF-8");
    (reason, output)
}

#[test]
fn test_sum() {
    assert_eq!(run_file("sum.asm", ""), (ExitReason::Halted, "3\n".to_string()));
}

#[test]
fn test_mul() {
    assert_eq!(run_file("mul.asm", ""), (ExitReason::Halted, "30\n".to_string()));
}

#[test]
fn test_euclid() {
    let (_, output) = run_file("euclid.asm", "12 8");
    assert_eq!(output, "4\n");

    let (_, output) = run_file("euclid.asm", "48\n180\n");
    assert_eq!(output, "12\n");
}

#[test]
fn test_mov() {
    assert_eq!(run_file("mov.asm", "").1, "5\n");
}

#[test]
fn test_pop() {
    assert_eq!(run_file("pop.asm", "").1, "1\n");
}

#[test]
fn test_countdown() {
    assert_eq!(
        run_file("countdown.asm", "3"),
        (ExitReason::Ended, "3\n2\n1\n".to_string())
    );
    assert_eq!(run_file("countdown.asm", "0").1, "");
}

#[test]
fn test_pairs() {
    assert_eq!(run_file("pairs.asm", "").1, "7\n8\n8\n7\n");
}

#[test]
fn test_all_samples_disassemble() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("programs");
    for entry in fs::read_dir(dir).expect("Failed to list programs") {
        let path = entry.expect("Bad directory entry").path();
        if path.extension().map_or(true, |ext| ext != "asm") {
            continue;
        }
        let source = fs::read_to_string(&path).expect("Failed to read program");
        let program = assemble(&source)
            .unwrap_or_else(|e| panic!("{} failed to assemble: {}", path.display(), e));

        let listing = program.disassemble().expect("Disassembly failed");
        let width: usize = listing.iter().map(|(_, i)| i.slots()).sum();
        assert_eq!(width, program.len(), "{}", path.display());
    }
}
