//! Register file pane

use super::utils::pane_block;
use crate::interpreter::registers::RegisterFile;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render_registers_pane(
    frame: &mut Frame,
    area: Rect,
    registers: &RegisterFile,
    previous: Option<&RegisterFile>,
    is_focused: bool,
) {
    let lines: Vec<Line> = registers
        .iter()
        .map(|(reg, value)| {
            // Registers written by the last instruction stand out
            let changed = previous.is_some_and(|prev| prev.get(reg) != value);
            let value_style = if changed {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };

            Line::from(vec![
                Span::styled(
                    format!(" {} ", reg.name()),
                    Style::default().fg(DEFAULT_THEME.register),
                ),
                Span::styled(format!("{:>11}", value), value_style),
                Span::styled(
                    format!("  0x{:08x}", value as u32),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(pane_block(" Registers ", is_focused));
    frame.render_widget(paragraph, area);
}
