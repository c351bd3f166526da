//! SerView Library
//!
//! Interactive serial device terminal: port discovery, a single managed
//! connection with a background read loop, and a timestamped activity log.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod tui;

pub use core::communication::{
    Action, ConnectionManager, ConnectionSettings, ConnectionState, LogEntry, MessageDirection,
    MessageLog,
};
pub use domain::config::SerViewConfig;
pub use domain::error::{SerViewError, SerViewResult};
pub use infrastructure::serial::{PortDiscovery, SerialPortDescriptor};
