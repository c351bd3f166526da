use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::{
    state::AppState,
    widgets::{
        help::render_help_popup,
        messages::render_activity_log,
        outgoing::render_input,
        ports::render_port_list,
        status::render_status_bar,
    },
};

pub fn draw_ui(f: &mut Frame, state: &mut AppState) {
    let size = f.size();
    state.terminal_size = (size.width, size.height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Ports + activity
            Constraint::Length(3), // Outgoing input
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    if state.show_port_list {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[0]);
        render_port_list(f, columns[0], state);
        render_activity_log(f, columns[1], state);
    } else {
        render_activity_log(f, chunks[0], state);
    }

    render_input(f, chunks[1], state);
    render_status_bar(f, chunks[2], state);

    if state.show_help {
        render_help_popup(f, size);
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::communication::{ConnectionState, LogEntry};
    use crate::domain::config::SerViewConfig;
    use crate::infrastructure::serial::SerialPortDescriptor;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|cell| cell.symbol.as_str()).collect()
    }

    #[test]
    fn test_draw_connected_layout() {
        let mut state = AppState::new(&SerViewConfig::default());
        let port = SerialPortDescriptor::from_path("/dev/ttyUSB0");
        state.set_ports(vec![port.clone()]);
        state.connection_state = ConnectionState::Connected;
        state.active_port = Some((port, 9600));
        state.status_message = None;
        state.entries.push(LogEntry::incoming("hello device"));

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| draw_ui(f, &mut state)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("/dev/ttyUSB0"));
        assert!(text.contains("hello device"));
        assert!(text.contains("Connected"));
        assert!(text.contains("Send (LF)"));
        assert_eq!(state.terminal_size, (100, 20));
    }

    #[test]
    fn test_draw_without_port_list_and_with_help() {
        let mut state = AppState::new(&SerViewConfig::default());
        state.toggle_port_list();
        state.toggle_help();

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| draw_ui(f, &mut state)).unwrap();

        let text = screen_text(&terminal);
        assert!(!text.contains("Ports ("));
        assert!(text.contains("SerView - Help"));
    }
}
