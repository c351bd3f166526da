use crate::{
    core::communication::{ConnectionState, LogEntry},
    domain::config::{DisplayConfig, LineEnding, SerViewConfig},
    infrastructure::serial::SerialPortDescriptor,
};

use super::input::InputBuffer;

/// Standard rates offered by the baud selector
pub const STANDARD_BAUD_RATES: [u32; 12] = [
    300, 1200, 2400, 4800, 9600, 19200, 38400, 57600, 115_200, 230_400, 460_800, 921_600,
];

/// Panel receiving key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Ports,
    Input,
}

#[derive(Debug)]
pub struct AppState {
    pub focus: Focus,
    pub show_port_list: bool,
    pub show_help: bool,
    pub ports: Vec<SerialPortDescriptor>,
    pub selected_port: usize,
    pub input: InputBuffer,
    pub status_message: Option<String>,
    pub connection_state: ConnectionState,
    pub active_port: Option<(SerialPortDescriptor, u32)>,
    /// Local mirror of the shared message log
    pub entries: Vec<LogEntry>,
    pub display: DisplayConfig,
    pub line_ending: LineEnding,
    pub terminal_size: (u16, u16),
    baud_rates: Vec<u32>,
    baud_index: usize,
}

impl AppState {
    pub fn new(config: &SerViewConfig) -> Self {
        let mut baud_rates = STANDARD_BAUD_RATES.to_vec();
        let configured = config.connection.baud_rate;
        if !baud_rates.contains(&configured) {
            baud_rates.push(configured);
            baud_rates.sort_unstable();
        }
        let baud_index = baud_rates
            .iter()
            .position(|&rate| rate == configured)
            .unwrap_or(0);

        Self {
            focus: Focus::Ports,
            show_port_list: true,
            show_help: false,
            ports: Vec::new(),
            selected_port: 0,
            input: InputBuffer::new(),
            status_message: Some("Welcome to SerView! Press '?' for help.".to_string()),
            connection_state: ConnectionState::Disconnected,
            active_port: None,
            entries: Vec::new(),
            display: config.display.clone(),
            line_ending: config.connection.line_ending,
            terminal_size: (80, 24),
            baud_rates,
            baud_index,
        }
    }

    /// Replace the port list, keeping the selection on the same device when
    /// it is still present
    pub fn set_ports(&mut self, ports: Vec<SerialPortDescriptor>) {
        let previous = self.selected().map(|port| port.name.clone());
        self.ports = ports;
        self.selected_port = previous
            .and_then(|name| self.ports.iter().position(|port| port.name == name))
            .unwrap_or(0);
    }

    pub fn selected(&self) -> Option<&SerialPortDescriptor> {
        self.ports.get(self.selected_port)
    }

    pub fn select_next(&mut self) {
        if !self.ports.is_empty() {
            self.selected_port = (self.selected_port + 1) % self.ports.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.ports.is_empty() {
            self.selected_port = self
                .selected_port
                .checked_sub(1)
                .unwrap_or(self.ports.len() - 1);
        }
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rates[self.baud_index]
    }

    /// Step to the next (or previous) rate, stopping at either end
    pub fn cycle_baud(&mut self, up: bool) {
        if up {
            self.baud_index = (self.baud_index + 1).min(self.baud_rates.len() - 1);
        } else {
            self.baud_index = self.baud_index.saturating_sub(1);
        }
    }

    pub fn toggle_port_list(&mut self) {
        self.show_port_list = !self.show_port_list;
        if !self.show_port_list {
            self.focus = Focus::Input;
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Ports => Focus::Input,
            Focus::Input if self.show_port_list => Focus::Ports,
            Focus::Input => Focus::Input,
        };
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}
