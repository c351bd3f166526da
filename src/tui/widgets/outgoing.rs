use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::communication::Action;
use crate::tui::state::{AppState, Focus};

pub fn render_input(f: &mut Frame, area: Rect, state: &AppState) {
    let enabled = state.connection_state.allows(Action::Send);
    let focused = state.focus == Focus::Input;

    let (title, text_style) = if enabled {
        (
            format!("Send ({})", state.line_ending),
            Style::default().fg(Color::White),
        )
    } else {
        (
            "Send (connect to a port first)".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let input = Paragraph::new(state.input.content().to_string())
        .style(text_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style),
        );
    f.render_widget(input, area);

    if focused && enabled {
        let inner_width = area.width.saturating_sub(2);
        let offset = (state.input.cursor_position() as u16).min(inner_width.saturating_sub(1));
        f.set_cursor(area.x + 1 + offset, area.y + 1);
    }
}
