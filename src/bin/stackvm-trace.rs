// stackvm-trace: record a run and browse it in the terminal

use std::fs;
use std::io::{self, BufReader};
use std::process;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use stackvm::parser::assemble;
use stackvm::snapshot::{Trace, TraceOutcome};
use stackvm::ui::App;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("stackvm-trace");

    let Some(path) = args.get(1) else {
        eprintln!("Error: No program file provided");
        eprintln!();
        eprintln!("Usage: {} <program.asm> [input-file]", program_name);
        eprintln!();
        eprintln!("Values for 'in' are read from input-file; without one, 'in' sees end of input.");
        process::exit(1);
    };

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

    eprintln!("Recording execution...");
    let trace = match args.get(2) {
        Some(input_path) => match fs::File::open(input_path) {
            Ok(file) => Trace::record(program, BufReader::new(file)),
            Err(e) => {
                eprintln!("Error: Cannot open input '{}': {}", input_path, e);
                process::exit(1);
            }
        },
        None => Trace::record(program, io::empty()),
    };

    match trace.outcome() {
        TraceOutcome::Faulted(err) => {
            eprintln!("Runtime error: {}", err);
            if let Some(fault) = err.stack_fault() {
                eprintln!("{}", fault.dump);
            }
            eprintln!("Entering TUI with partial execution history...");
        }
        outcome => eprintln!("Recorded {} snapshots, program {}.", trace.len(), outcome),
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(trace, source);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
