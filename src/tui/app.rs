use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{
    event::{AppEvent, EventHandler},
    state::{AppState, Focus},
    ui::draw_ui,
};
use crate::{
    core::communication::{ConnectionManager, ConnectionState, MessageLog},
    domain::{
        config::SerViewConfig,
        error::{SerViewError, SerViewResult},
    },
    infrastructure::serial::PortDiscovery,
};

/// Write the log's export text to `serview-<timestamp>.log` in `dir`
pub fn export_log(log: &MessageLog, dir: &Path) -> SerViewResult<PathBuf> {
    let name = format!("serview-{}.log", chrono::Local::now().format("%Y%m%d-%H%M%S"));
    let path = dir.join(name);
    std::fs::write(&path, log.export_text())?;
    Ok(path)
}

pub struct App {
    state: AppState,
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    events: EventHandler,
    manager: ConnectionManager,
    discovery: PortDiscovery,
    state_rx: watch::Receiver<ConnectionState>,
    tick_rate: Duration,
    should_quit: bool,
}

impl App {
    pub fn new(config: SerViewConfig) -> SerViewResult<Self> {
        let manager = ConnectionManager::system(&config.connection);
        let discovery = PortDiscovery::system();
        let state_rx = manager.subscribe();

        let mut state = AppState::new(&config);
        state.set_ports(discovery.list_ports());

        // Setup terminal
        enable_raw_mode().map_err(|e| SerViewError::Tui(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .map_err(|e| SerViewError::Tui(e.to_string()))?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(|e| SerViewError::Tui(e.to_string()))?;

        Ok(Self {
            state,
            terminal,
            events: EventHandler::new(),
            manager,
            discovery,
            state_rx,
            tick_rate: Duration::from_millis(50),
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> SerViewResult<()> {
        let result = self.event_loop().await;

        if let Err(e) = self.manager.disconnect().await {
            warn!("Disconnect on exit failed: {}", e);
        }
        result
    }

    async fn event_loop(&mut self) -> SerViewResult<()> {
        while !self.should_quit {
            self.sync_with_core();

            self.terminal
                .draw(|f| draw_ui(f, &mut self.state))
                .map_err(|e| SerViewError::Tui(e.to_string()))?;

            if event::poll(self.tick_rate).map_err(|e| SerViewError::Tui(e.to_string()))? {
                match event::read().map_err(|e| SerViewError::Tui(e.to_string()))? {
                    Event::Key(key) => {
                        if let Some(app_event) = self.events.handle_key_event(key, &mut self.state) {
                            self.dispatch(app_event).await;
                        }
                    }
                    Event::Resize(width, height) => {
                        self.state.terminal_size = (width, height);
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Pull state transitions and new log entries from the core
    fn sync_with_core(&mut self) {
        if self.state_rx.has_changed().unwrap_or(false) {
            let current = *self.state_rx.borrow_and_update();
            self.state.connection_state = current;
            self.state.active_port = self.manager.active_port();

            // A fault may connect and drop between two frames, so only the
            // resulting state is inspected
            if current == ConnectionState::Disconnected {
                if let Some(fault) = self.manager.last_fault() {
                    self.state.set_status_message(format!("Connection lost: {}", fault));
                }
                if self.state.show_port_list {
                    self.state.focus = Focus::Ports;
                }
            }
        }

        let log = self.manager.log();
        if log.len() < self.state.entries.len() {
            self.state.entries.clear();
        }
        let fresh = log.snapshot_from(self.state.entries.len());
        self.state.entries.extend(fresh);
    }

    async fn dispatch(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => {
                self.should_quit = true;
            }
            AppEvent::RefreshPorts => {
                self.state.set_ports(self.discovery.list_ports());
                let count = self.state.ports.len();
                self.state.set_status_message(format!("Found {} serial port(s)", count));
            }
            AppEvent::Connect { port, baud_rate } => {
                match self.manager.connect(&port, baud_rate).await {
                    Ok(()) => {
                        self.state.set_status_message(format!(
                            "Connected to {} at {} baud",
                            port.name, baud_rate
                        ));
                        self.state.focus = Focus::Input;
                    }
                    Err(e) => self.state.set_status_message(e.to_string()),
                }
            }
            AppEvent::Disconnect => match self.manager.disconnect().await {
                Ok(()) => self.state.set_status_message("Disconnected"),
                Err(e) => self.state.set_status_message(format!("Disconnected: {}", e)),
            },
            AppEvent::Send(text) => {
                let terminator = self.state.line_ending.as_str();
                if let Err(e) = self.manager.send(&text, terminator).await {
                    self.state.set_status_message(e.to_string());
                } else {
                    self.state.clear_status_message();
                }
            }
            AppEvent::ClearLog => {
                self.manager.log().clear();
                self.state.entries.clear();
                self.state.set_status_message("Activity log cleared");
            }
            AppEvent::ExportLog => {
                let exported = std::env::current_dir()
                    .map_err(SerViewError::from)
                    .and_then(|dir| export_log(self.manager.log(), &dir));
                match exported {
                    Ok(path) => {
                        info!("Exported activity log to {}", path.display());
                        self.state
                            .set_status_message(format!("Exported log to {}", path.display()));
                    }
                    Err(e) => self.state.set_status_message(format!("Export failed: {}", e)),
                }
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
