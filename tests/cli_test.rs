// The stackvm binary driven as a subprocess

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn run_binary(program: &Path, stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_stackvm"))
        .arg(program)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start stackvm");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for stackvm")
}

/// Write `source` into its own scratch directory and return the program path
fn scratch_program(name: &str, source: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::create_dir_all(&dir).expect("Failed to create scratch directory");
    let path = dir.join("program.asm");
    fs::write(&path, source).expect("Failed to write program");
    path
}

#[test]
fn test_euclid_reads_stdin() {
    let program = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("programs")
        .join("euclid.asm");
    let output = run_binary(&program, "12 8");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "4\n");
}

#[test]
fn test_malformed_source_exits_with_parse_error() {
    let program = scratch_program("cli_malformed", "push 1\nfrobnicate RAX\nhlt\n");
    let output = run_binary(&program, "");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parse error at line 2"), "{}", stderr);
}

#[test]
fn test_underflow_exits_with_runtime_error() {
    let program = scratch_program("cli_underflow", "add\nhlt\n");
    let output = run_binary(&program, "");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Runtime error: Stack underflow"), "{}", stderr);
    // Underflow is not corruption, so no dump is written
    assert!(!program.with_file_name("stack_error.txt").exists());
}

#[test]
fn test_missing_file_exits_with_usage() {
    let output = run_binary(Path::new("does/not/exist.asm"), "");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "{}", stderr);
    assert!(stderr.contains("Usage:"), "{}", stderr);
}
