//! Trace viewer state and event loop

use crate::snapshot::{Trace, TraceOutcome};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

use super::panes::{self, SourceScrollState, StatusRenderData};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Terminal,
    Registers,
    Stack,
}

impl FocusedPane {
    /// Clockwise: source -> terminal -> registers -> stack
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Terminal,
            FocusedPane::Terminal => FocusedPane::Registers,
            FocusedPane::Registers => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Source,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Stack,
            FocusedPane::Terminal => FocusedPane::Source,
            FocusedPane::Registers => FocusedPane::Terminal,
            FocusedPane::Stack => FocusedPane::Registers,
        }
    }
}

/// The main application state
pub struct App {
    pub trace: Trace,

    /// Program text shown in the source pane
    pub source_code: String,

    pub focused_pane: FocusedPane,

    pub source_scroll: SourceScrollState,
    pub stack_scroll: usize,
    pub terminal_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(mut trace: Trace, source_code: String) -> Self {
        trace.rewind_to_start();
        let long_ago = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);

        App {
            trace,
            source_code,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            stack_scroll: 0,
            terminal_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: long_ago,
            last_space_press: long_ago,
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_millis(500) {
                if self.trace.step_forward().is_ok() {
                    self.status_message = "Playing...".to_string();
                    self.terminal_scroll = usize::MAX;
                } else {
                    self.is_playing = false;
                    self.status_message = self.end_message();
                }
                self.last_play_time = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Whether the cursor sits on the state right before a fault
    fn at_fault(&self) -> bool {
        self.trace.at_end() && matches!(self.trace.outcome(), TraceOutcome::Faulted(_))
    }

    fn end_message(&self) -> String {
        format!("Program {}", self.trace.outcome())
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Terminal (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Registers (top) | Stack (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(columns[1]);

        let at_fault = self.at_fault();
        let position = self.trace.position();

        if let Some(snapshot) = self.trace.current() {
            panes::render_source_pane(
                frame,
                left_rows[0],
                &self.source_code,
                snapshot.source_line,
                at_fault,
                self.focused_pane == FocusedPane::Source,
                &mut self.source_scroll,
            );

            panes::render_terminal_pane(
                frame,
                left_rows[1],
                &snapshot.terminal,
                self.focused_pane == FocusedPane::Terminal,
                &mut self.terminal_scroll,
            );

            let previous = position
                .checked_sub(1)
                .and_then(|i| self.trace.snapshot(i))
                .map(|s| &s.registers);
            panes::render_registers_pane(
                frame,
                right_rows[0],
                &snapshot.registers,
                previous,
                self.focused_pane == FocusedPane::Registers,
            );

            panes::render_stack_pane(
                frame,
                right_rows[1],
                &snapshot.stack,
                snapshot.capacity,
                self.focused_pane == FocusedPane::Stack,
                &mut self.stack_scroll,
            );
        }

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &StatusRenderData {
                message: &self.status_message,
                position,
                total: self.trace.len(),
                outcome: self.trace.outcome(),
                is_playing: self.is_playing,
            },
        );
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if self.trace.step_forward().is_err() {
                        break;
                    }
                    stepped += 1;
                }
                self.status_message = if self.trace.at_end() {
                    self.end_message()
                } else {
                    format!("Stepped forward {} step(s)", stepped)
                };
                self.terminal_scroll = usize::MAX;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Current line moves down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Stack => {
                    self.stack_scroll = self.stack_scroll.saturating_sub(1);
                }
                FocusedPane::Terminal => {
                    self.terminal_scroll = self.terminal_scroll.saturating_sub(1);
                }
                FocusedPane::Registers => {}
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Stack => {
                    self.stack_scroll = self.stack_scroll.saturating_add(1);
                }
                FocusedPane::Terminal => {
                    self.terminal_scroll = self.terminal_scroll.saturating_add(1);
                }
                FocusedPane::Registers => {}
            },
            KeyCode::Char(' ') => {
                // 200ms debounce against key repeat
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    self.status_message = if self.is_playing {
                        "Playing...".to_string()
                    } else {
                        "Paused".to_string()
                    };
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.trace.jump_to_end();
                self.status_message = self.end_message();
                self.terminal_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.trace.rewind_to_start();
                self.status_message = "Jumped to start".to_string();
                self.terminal_scroll = usize::MAX;
            }
            _ => {}
        }
    }

    fn step_forward(&mut self) {
        match self.trace.step_forward() {
            Ok(()) if self.trace.at_end() => {
                self.status_message = self.end_message();
                self.terminal_scroll = usize::MAX;
            }
            Ok(()) => {
                self.status_message = "Stepped forward".to_string();
                self.terminal_scroll = usize::MAX;
            }
            Err(edge) => {
                self.status_message = format!("Cannot step forward: {}", edge);
            }
        }
    }

    fn step_backward(&mut self) {
        match self.trace.step_backward() {
            Ok(()) => {
                self.status_message = "Stepped backward".to_string();
                self.terminal_scroll = usize::MAX;
            }
            Err(edge) => {
                self.status_message = format!("Cannot step backward: {}", edge);
            }
        }
    }
}
