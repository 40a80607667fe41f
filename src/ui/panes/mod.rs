//! TUI pane rendering
//!
//! - [`source`]: assembly listing with highlighting and the current line
//! - [`registers`]: the register file
//! - [`stack`]: live stack values, top first
//! - [`terminal`]: lines written by `out`
//! - [`status`]: step counter, outcome and keybindings

mod utils;

pub mod registers;
pub mod source;
pub mod stack;
pub mod status;
pub mod terminal;

pub use registers::render_registers_pane;
pub use source::{render_source_pane, SourceScrollState};
pub use stack::render_stack_pane;
pub use status::{render_status_bar, StatusRenderData};
pub use terminal::render_terminal_pane;
