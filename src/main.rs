// stackvm: assemble a program and run it against stdin/stdout

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use stackvm::interpreter::{ExitReason, Processor, RuntimeError};
use stackvm::parser::assemble;

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} <program.asm>", program_name);
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} programs/sum.asm", program_name);
    eprintln!("  echo 12 8 | {} programs/euclid.asm", program_name);
}

/// Full stack dump written beside the program on corruption
const DUMP_FILE_NAME: &str = "stack_error.txt";

fn dump_path(program_path: &Path) -> PathBuf {
    program_path.with_file_name(DUMP_FILE_NAME)
}

fn report_runtime_error(err: &RuntimeError, program_path: &Path) {
    eprintln!("Runtime error: {}", err);
    if let Some(fault) = err.stack_fault() {
        eprintln!("{}", fault.dump);
        let target = dump_path(program_path);
        match fs::write(&target, fault.dump.full().to_string()) {
            Ok(()) => eprintln!("Full dump written to {}", target.display()),
            Err(e) => eprintln!("Error: Cannot write dump to '{}': {}", target.display(), e),
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("stackvm");

    let Some(path) = args.get(1) else {
        eprintln!("Error: No program file provided");
        eprintln!();
        print_usage(program_name);
        process::exit(1);
    };

    if !Path::new(path).exists() {
        eprintln!("Error: File '{}' not found", path);
        print_usage(program_name);
        process::exit(1);
    }

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", path, e);
            process::exit(1);
        }
    };

    eprintln!("Assembling {}...", path);
    let program = match assemble(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    eprintln!(
        "Assembled {} slots, {} labels.",
        program.len(),
        program.labels().len()
    );

    let mut processor = Processor::new(program, io::stdout().lock()).with_input(io::stdin().lock());

    match processor.run() {
        Ok(ExitReason::RanOffEnd) => {
            eprintln!("Warning: execution ran past the last instruction without 'hlt' or 'end'");
        }
        Ok(ExitReason::Halted | ExitReason::Ended) => {}
        Err(err) => {
            report_runtime_error(&err, Path::new(path));
            process::exit(1);
        }
    }
}
