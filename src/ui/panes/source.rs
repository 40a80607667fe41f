//! Source pane rendering with assembly highlighting
//!
//! Mnemonics, registers, immediates, labels and `;` comments each get their
//! own color. The line holding the next instruction is marked and kept at a
//! fixed row while stepping; when the last step faulted it is drawn in the
//! error color instead.

use super::utils::{pane_block, visible_height};
use crate::parser::isa::{Mnemonic, Register, COMMENT_START, LABEL_TERMINATOR};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

fn word_style(word: &str) -> Style {
    if let Some(label) = word.strip_suffix(LABEL_TERMINATOR) {
        if !label.is_empty() {
            return Style::default()
                .fg(DEFAULT_THEME.label)
                .add_modifier(Modifier::BOLD);
        }
    }
    if Mnemonic::lookup(word).is_some() {
        Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD)
    } else if Register::lookup(word).is_some() {
        Style::default().fg(DEFAULT_THEME.register)
    } else if word.parse::<i64>().is_ok() {
        Style::default().fg(DEFAULT_THEME.number)
    } else {
        // Jump targets
        Style::default().fg(DEFAULT_THEME.label)
    }
}

/// Split a line into styled spans, preserving its exact text
fn highlight_line(line: &str) -> Line<'_> {
    let (code, comment) = match line.find(COMMENT_START) {
        Some(pos) => line.split_at(pos),
        None => (line, ""),
    };

    let mut spans = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, c) in code.char_indices() {
        let is_separator = c.is_whitespace() || c == ',';
        match (is_separator, word_start) {
            (true, Some(start)) => {
                spans.push(Span::styled(&code[start..i], word_style(&code[start..i])));
                spans.push(Span::raw(&code[i..i + c.len_utf8()]));
                word_start = None;
            }
            (true, None) => spans.push(Span::raw(&code[i..i + c.len_utf8()])),
            (false, None) => word_start = Some(i),
            (false, Some(_)) => {}
        }
    }
    if let Some(start) = word_start {
        spans.push(Span::styled(&code[start..], word_style(&code[start..])));
    }

    if !comment.is_empty() {
        spans.push(Span::styled(
            comment,
            Style::default().fg(DEFAULT_THEME.comment),
        ));
    }

    Line::from(spans)
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the current line is pinned to; centered on first render
    pub target_line_row: Option<usize>,
}

/// Render the program listing. `current_line` is 1-based; `None` hides the
/// marker (e.g. after running past the last instruction).
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current_line: Option<usize>,
    is_error: bool,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();
    let height = visible_height(area);

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(height / 2)
        .min(height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    if let Some(line) = current_line.filter(|&l| l > 0 && l <= total_lines) {
        scroll_state.offset = (line - 1).saturating_sub(target_row);
        if total_lines > height {
            scroll_state.offset = scroll_state.offset.min(total_lines - height);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = current_line == Some(line_num);
            let mut content = highlight_line(line);

            let num_style = if is_current && is_error {
                for span in &mut content.spans {
                    span.style = Style::default()
                        .bg(DEFAULT_THEME.error)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD);
                }
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                for span in &mut content.spans {
                    span.style = span
                        .style
                        .patch(Style::default().bg(DEFAULT_THEME.current_line_bg));
                }
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let marker = if is_current { "→" } else { " " };
            let mut spans = vec![Span::styled(format!("{}{:4} ", marker, line_num), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(pane_block(" Source ", is_focused));
    frame.render_widget(paragraph, area);
}
