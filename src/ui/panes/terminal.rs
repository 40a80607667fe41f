//! Terminal output pane rendering

use super::utils::{clamp_scroll, pane_block, visible_height};
use crate::snapshot::MockTerminal;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the values written by `out` so far
pub fn render_terminal_pane(
    frame: &mut Frame,
    area: Rect,
    terminal: &MockTerminal,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Terminal Output ", is_focused);
    let lines = terminal.get_output();

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let height = visible_height(area);
    clamp_scroll(scroll_offset, lines.len(), height);

    let items: Vec<ListItem> = lines
        .iter()
        .skip(*scroll_offset)
        .take(height)
        .map(|line| ListItem::new(line.as_str()).style(Style::default().fg(DEFAULT_THEME.fg)))
        .collect();

    let list = List::new(items).block(block.padding(Padding::new(1, 0, 0, 0)));
    frame.render_widget(list, area);
}
