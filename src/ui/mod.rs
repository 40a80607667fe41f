//! Terminal trace viewer built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! - **[`app`]**: viewer state, keyboard event loop, pane focus
//! - **[`panes`]**: stateless render functions for each pane (source,
//!   registers, stack, terminal, status bar)
//! - **[`theme`]**: color palette shared by all panes
//!
//! Construct an [`App`] from a recorded [`Trace`] and call [`App::run`].
//!
//! [`Trace`]: crate::snapshot::Trace
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
