//! Helpers shared by the pane renderers

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders},
};

/// Bordered block whose border reflects focus
pub(super) fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Rows available inside a bordered pane, at least one
pub(super) fn visible_height(area: Rect) -> usize {
    area.height.saturating_sub(2).max(1) as usize
}

/// Clamp a scroll offset so the last page stays full
pub(super) fn clamp_scroll(offset: &mut usize, total_items: usize, visible_height: usize) {
    if total_items > visible_height {
        *offset = (*offset).min(total_items - visible_height);
    } else {
        *offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_scroll() {
        let mut offset = usize::MAX;
        clamp_scroll(&mut offset, 30, 10);
        assert_eq!(offset, 20);

        let mut offset = 5;
        clamp_scroll(&mut offset, 3, 10);
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_visible_height_never_zero() {
        assert_eq!(visible_height(Rect::new(0, 0, 10, 1)), 1);
        assert_eq!(visible_height(Rect::new(0, 0, 10, 12)), 10);
    }
}
