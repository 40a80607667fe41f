//! Processor execution engine
//!
//! This module provides the fetch-decode-execute loop:
//! - [`engine`]: [`engine::Processor`], stepping and running a program
//! - [`registers`]: the four-slot register file
//! - [`io`]: the input/output boundary for `in` and `out`
//! - [`errors`]: runtime fault types
//!
//! # Execution Model
//!
//! The instruction pointer starts at offset 0. Each step decodes the
//! instruction at the pointer, executes it against the guarded stack and the
//! registers, then either advances past it or jumps to a resolved label.
//! Execution stops at `hlt`, `end`, when the pointer runs past the end of the
//! stream, or at the first fault.

pub mod constants;
pub mod engine;
pub mod errors;
pub mod io;
mod jumps;
mod ops;
pub mod registers;

pub use engine::{ExitReason, Processor, StepOutcome};
pub use errors::RuntimeError;
