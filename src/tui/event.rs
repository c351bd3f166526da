use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    core::communication::Action,
    infrastructure::serial::SerialPortDescriptor,
};

use super::state::{AppState, Focus};

/// Requests for the application loop; produced by key handling, carried out
/// against the connection manager
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,
    RefreshPorts,
    Connect {
        port: SerialPortDescriptor,
        baud_rate: u32,
    },
    Disconnect,
    Send(String),
    ClearLog,
    ExportLog,
}

/// Maps key presses to [`AppEvent`]s. Local view changes (selection, focus,
/// editing) are applied to the state directly.
#[derive(Debug, Default)]
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent, state: &mut AppState) -> Option<AppEvent> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.handle_control_key(key, state);
        }

        if state.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                state.toggle_help();
            }
            return None;
        }

        if key.code == KeyCode::Tab {
            state.toggle_focus();
            return None;
        }

        match state.focus {
            Focus::Ports => self.handle_ports_panel(key, state),
            Focus::Input => self.handle_input_panel(key, state),
        }
    }

    fn handle_control_key(&self, key: KeyEvent, state: &mut AppState) -> Option<AppEvent> {
        let connection_state = state.connection_state;
        match key.code {
            KeyCode::Char('c') => Some(AppEvent::Quit),
            KeyCode::Char('l') => {
                state.toggle_port_list();
                None
            }
            KeyCode::Char('d') if connection_state.allows(Action::Disconnect) => Some(AppEvent::Disconnect),
            KeyCode::Char('d') => {
                state.set_status_message("Not connected");
                None
            }
            KeyCode::Char('k') if connection_state.allows(Action::ClearLog) => Some(AppEvent::ClearLog),
            KeyCode::Char('e') if connection_state.allows(Action::ExportLog) => Some(AppEvent::ExportLog),
            _ => None,
        }
    }

    fn handle_ports_panel(&self, key: KeyEvent, state: &mut AppState) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Quit),
            KeyCode::Char('?') => {
                state.toggle_help();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                state.select_previous();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                state.select_next();
                None
            }
            KeyCode::Char('[') => {
                state.cycle_baud(false);
                None
            }
            KeyCode::Char(']') => {
                state.cycle_baud(true);
                None
            }
            KeyCode::Char('r') if state.connection_state.allows(Action::ListPorts) => {
                Some(AppEvent::RefreshPorts)
            }
            KeyCode::Enter => {
                if !state.connection_state.allows(Action::Connect) {
                    state.set_status_message("Already connected; press Ctrl-D to disconnect first");
                    return None;
                }
                match state.selected() {
                    Some(port) => Some(AppEvent::Connect {
                        port: port.clone(),
                        baud_rate: state.baud_rate(),
                    }),
                    None => {
                        state.set_status_message("No serial port selected; press 'r' to refresh");
                        None
                    }
                }
            }
            _ => None,
        }
    }

    fn handle_input_panel(&self, key: KeyEvent, state: &mut AppState) -> Option<AppEvent> {
        if key.code == KeyCode::Esc {
            if state.show_port_list {
                state.focus = Focus::Ports;
            }
            return None;
        }

        // Typing is ignored while sending is not possible
        if !state.connection_state.allows(Action::Send) {
            return None;
        }

        if key.code == KeyCode::Enter {
            return Some(AppEvent::Send(state.input.take()));
        }

        state.input.handle_key(key);
        None
    }
}
