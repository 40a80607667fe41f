//! # Introduction
//!
//! stackvm assembles a small stack-machine assembly language into a flat
//! integer instruction stream and executes it on a processor whose operand
//! stack is self-verifying: canaries at both ends of the control record and
//! of the storage buffer, Adler-32 checksums over both, and poisoned unused
//! slots. Any detected corruption stops execution with a diagnostic dump.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Assembler (2 passes) → Program → Processor → Output
//!                                                 ↘ Trace → TUI
//! ```
//!
//! 1. [`parser`]: lexes source lines, resolves labels and encodes the
//!    [`parser::Program`].
//! 2. [`interpreter`]: the [`interpreter::Processor`] fetch-decode-execute
//!    loop with four registers and a [`memory::stack::GuardedStack`].
//! 3. [`memory`]: the guarded stack, its checksum, poison patterns and
//!    fault dumps.
//! 4. [`snapshot`]: records a run step by step for reverse navigation,
//!    capturing output in a [`snapshot::MockTerminal`].
//! 5. [`ui`]: ratatui trace viewer; not part of the stable library API.
//!
//! ## Instruction set
//!
//! `push`, `pop`, `dup`, `swp`, `mov`, `in`, `out`, `mul`, `add`, `mod`,
//! `jmp`, `je`, `jne`, `end`, `hlt`, with registers `RAX`..`RDX`.

pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod snapshot;
pub mod ui;
