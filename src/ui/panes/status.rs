//! Status bar rendering with keybindings and state indicators

use crate::snapshot::TraceOutcome;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Everything the status bar shows
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub position: usize,
    pub total: usize,
    pub outcome: &'a TraceOutcome,
    pub is_playing: bool,
}

fn badge<'a>(text: impl Into<Cow<'a, str>>, bg: Color) -> Span<'a> {
    Span::styled(
        text,
        Style::default()
            .bg(bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, data: &StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let is_at_end = data.position + 1 >= data.total;
    let faulted = matches!(data.outcome, TraceOutcome::Faulted(_));
    let show_fault = faulted && is_at_end;

    let step_color = if show_fault {
        DEFAULT_THEME.error
    } else {
        DEFAULT_THEME.primary
    };
    let bar_style = Style::default().bg(DEFAULT_THEME.current_line_bg);

    let left_spans = vec![
        badge(
            format!(" Step {}/{} ", data.position + 1, data.total),
            step_color,
        ),
        Span::styled(" | ", bar_style.fg(DEFAULT_THEME.comment)),
        Span::styled(
            format!(" {} ", data.message),
            bar_style.fg(if show_fault {
                DEFAULT_THEME.error
            } else {
                DEFAULT_THEME.fg
            }),
        ),
    ];

    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(bar_style)
            .alignment(Alignment::Left),
        layout[0],
    );

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar_style.fg(DEFAULT_THEME.fg);
    let sep_style = bar_style.fg(DEFAULT_THEME.comment);

    let mut right_spans = vec![
        Span::styled(" ←/→ ", key_style),
        Span::styled(" step ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ⎵ ", key_style),
        Span::styled(" play ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ↵ / ⌫ ", key_style),
        Span::styled(" end/start ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" q ", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let indicator = if data.is_playing {
        Some(badge(" ▶ PLAYING ", DEFAULT_THEME.secondary))
    } else if show_fault {
        Some(badge(" FAULT ", DEFAULT_THEME.error))
    } else if is_at_end {
        Some(badge(" END ", DEFAULT_THEME.success))
    } else if data.position == 0 {
        Some(badge(" START ", DEFAULT_THEME.success))
    } else {
        None
    };
    if let Some(indicator) = indicator {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(indicator);
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(bar_style)
            .alignment(Alignment::Right),
        layout[1],
    );
}
