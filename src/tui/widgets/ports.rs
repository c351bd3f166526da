use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::tui::state::{AppState, Focus};

pub fn render_port_list(f: &mut Frame, area: Rect, state: &AppState) {
    let border_style = if state.focus == Focus::Ports {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let title = format!("Ports ({}) @ {} baud", state.ports.len(), state.baud_rate());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style);

    if state.ports.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from("No serial ports found"),
            Line::from(""),
            Line::from("r - Refresh"),
        ])
        .block(block)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
        f.render_widget(empty, area);
        return;
    }

    let active = state.active_port.as_ref().map(|(port, _)| port.name.as_str());
    let items: Vec<ListItem> = state
        .ports
        .iter()
        .map(|port| {
            let connected = active == Some(port.name.as_str());
            let (icon, icon_color) = if connected {
                ("●", Color::Green)
            } else {
                ("○", Color::DarkGray)
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(icon, Style::default().fg(icon_color)),
                    Span::raw(" "),
                    Span::styled(port.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ]),
                Line::from(Span::styled(
                    format!("  {}", port.description),
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(
                    format!("  {}", port.hardware_id),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    let mut list_state = ListState::default().with_selected(Some(state.selected_port));
    f.render_stateful_widget(list, area, &mut list_state);
}
