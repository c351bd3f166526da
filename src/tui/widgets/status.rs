use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::core::communication::{Action, ConnectionState};
use crate::tui::state::AppState;

/// Key legend for the operations the current state allows
pub fn key_legend(state: ConnectionState) -> String {
    let mut keys: Vec<&str> = state
        .allowed_actions()
        .iter()
        .map(|action| match action {
            Action::ListPorts => "r Refresh",
            Action::Connect => "Enter Connect",
            Action::Disconnect => "^D Disconnect",
            Action::Send => "Enter Send",
            Action::ClearLog => "^K Clear",
            Action::ExportLog => "^E Export",
        })
        .collect();
    keys.extend(["? Help", "q Quit"]);
    keys.join(" | ")
}

pub fn render_status_bar(f: &mut Frame, area: Rect, state: &AppState) {
    let (indicator, color) = match state.connection_state {
        ConnectionState::Connected => ("● Connected", Color::Green),
        ConnectionState::Disconnected => ("○ Disconnected", Color::Red),
    };

    let mut spans = vec![
        Span::styled(indicator, Style::default().fg(color)),
        Span::raw(" | "),
    ];
    match &state.status_message {
        Some(message) => spans.push(Span::styled(message.clone(), Style::default().fg(Color::Yellow))),
        None => spans.push(Span::styled(
            key_legend(state.connection_state),
            Style::default().fg(Color::Gray),
        )),
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_follows_state() {
        let disconnected = key_legend(ConnectionState::Disconnected);
        assert!(disconnected.contains("Enter Connect"));
        assert!(!disconnected.contains("Disconnect"));
        assert!(!disconnected.contains("Send"));

        let connected = key_legend(ConnectionState::Connected);
        assert!(connected.contains("^D Disconnect"));
        assert!(connected.contains("Enter Send"));
        assert!(!connected.contains("Enter Connect"));
    }
}
