//! Stack pane rendering
//!
//! Values are listed top first. Each row shows the slot index, the decimal
//! value and its hex form; the title carries the live size and the capacity
//! of the underlying buffer.

use super::utils::{clamp_scroll, pane_block, visible_height};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    stack: &[i32],
    capacity: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Stack [{}/{}] ", stack.len(), capacity);
    let block = pane_block(&title, is_focused);

    if stack.is_empty() {
        let paragraph = Paragraph::new("(empty)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let height = visible_height(area);
    clamp_scroll(scroll_offset, stack.len(), height);

    let items: Vec<ListItem> = stack
        .iter()
        .enumerate()
        .rev()
        .skip(*scroll_offset)
        .take(height)
        .map(|(index, &value)| {
            let is_top = index + 1 == stack.len();
            let marker = if is_top { "→" } else { " " };
            let value_style = if is_top {
                Style::default()
                    .fg(DEFAULT_THEME.number)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} [{:3}] ", marker, index),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(format!("{:>11}", value), value_style),
                Span::styled(
                    format!("  0x{:08x}", value as u32),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
