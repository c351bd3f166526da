use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::communication::{LogEntry, MessageDirection};
use crate::domain::config::DisplayConfig;
use crate::tui::state::AppState;

/// Render one entry as `<timestamp> <prefix> <payload>`. Embedded newlines
/// continue on indented lines.
pub fn entry_lines(entry: &LogEntry, display: &DisplayConfig) -> Vec<Line<'static>> {
    let color = match entry.direction {
        MessageDirection::Incoming => Color::Green,
        MessageDirection::Outgoing => Color::Cyan,
    };
    let text_style = Style::default().fg(color);

    let mut lead = Vec::with_capacity(3);
    if display.include_timestamp {
        lead.push(Span::styled(
            format!("{} ", entry.timestamp.format(&display.timestamp_format)),
            Style::default().fg(Color::Yellow),
        ));
    }
    let prefix = format!("{} ", entry.prefix(display));
    let indent = " ".repeat(prefix.chars().count());
    lead.push(Span::styled(prefix, text_style));

    let mut lines = Vec::new();
    let mut first = Some(lead);
    for segment in entry.payload.split('\n') {
        let segment = segment.trim_end_matches('\r').to_string();
        let mut spans = match first.take() {
            Some(lead) => lead,
            None => vec![Span::raw(indent.clone())],
        };
        spans.push(Span::styled(segment, text_style));
        lines.push(Line::from(spans));
    }
    lines
}

pub fn render_activity_log(f: &mut Frame, area: Rect, state: &AppState) {
    let title = match &state.active_port {
        Some((port, baud)) => format!("Activity - {} @ {} baud", port.name, baud),
        None => "Activity".to_string(),
    };

    // Only the tail that fits is rendered
    let visible = area.height.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for entry in state.entries.iter().rev() {
        if lines.len() >= visible {
            break;
        }
        let mut block = entry_lines(entry, &state.display);
        block.extend(lines);
        lines = block;
    }
    let skip = lines.len().saturating_sub(visible);
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();

    let log = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Blue)),
    );
    f.render_widget(log, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_entry_line_layout() {
        let display = DisplayConfig {
            include_timestamp: false,
            ..DisplayConfig::default()
        };
        let lines = entry_lines(&LogEntry::incoming("OK"), &display);
        assert_eq!(lines.len(), 1);
        assert_eq!(text(&lines[0]), ">>> OK");
        assert_eq!(lines[0].spans[1].style.fg, Some(Color::Green));

        let lines = entry_lines(&LogEntry::outgoing("AT"), &display);
        assert_eq!(text(&lines[0]), "<<< AT");
        assert_eq!(lines[0].spans[1].style.fg, Some(Color::Cyan));
    }

    #[test]
    fn test_timestamp_span_is_yellow() {
        let display = DisplayConfig {
            timestamp_format: "%H:%M".to_string(),
            ..DisplayConfig::default()
        };
        let lines = entry_lines(&LogEntry::incoming("x"), &display);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Yellow));
        assert_eq!(lines[0].spans[0].content.len(), "12:34 ".len());
    }

    #[test]
    fn test_multiline_payload_is_indented() {
        let display = DisplayConfig {
            include_timestamp: false,
            ..DisplayConfig::default()
        };
        let lines = entry_lines(&LogEntry::incoming("line1\r\nline2"), &display);
        assert_eq!(lines.len(), 2);
        assert_eq!(text(&lines[0]), ">>> line1");
        assert_eq!(text(&lines[1]), "    line2");
    }
}
