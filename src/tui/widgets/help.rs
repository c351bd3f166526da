use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::ui::centered_rect;

pub fn render_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 80, area);

    // Clear the background
    f.render_widget(Clear, popup_area);

    let help_content = vec![
        Line::from("SerView - Help"),
        Line::from(""),
        Line::from("Global:"),
        Line::from("  Tab      - Switch focus (ports / input)"),
        Line::from("  Ctrl-L   - Show or hide the port list"),
        Line::from("  Ctrl-D   - Disconnect"),
        Line::from("  Ctrl-K   - Clear the activity log"),
        Line::from("  Ctrl-E   - Export the activity log to a file"),
        Line::from("  Ctrl-C   - Quit"),
        Line::from(""),
        Line::from("Port list:"),
        Line::from("  Up/Down  - Select port"),
        Line::from("  [ / ]    - Lower / raise baud rate"),
        Line::from("  Enter    - Connect"),
        Line::from("  r        - Refresh ports"),
        Line::from("  ?        - Toggle help"),
        Line::from("  q / Esc  - Quit"),
        Line::from(""),
        Line::from("Input (while connected):"),
        Line::from("  Enter    - Send line"),
        Line::from("  Esc      - Back to port list"),
    ];

    let help = Paragraph::new(help_content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}
