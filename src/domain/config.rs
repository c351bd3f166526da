use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::error::{SerViewError, SerViewResult};

/// SerView configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerViewConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Defaults applied when opening a connection
    #[serde(default)]
    pub connection: ConnectionDefaults,
    /// Activity log rendering
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log file used while the terminal UI owns the screen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// Connection defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDefaults {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Terminator appended to every outgoing line
    #[serde(default)]
    pub line_ending: LineEnding,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default)]
    pub parity: ParityConfig,
    #[serde(default)]
    pub flow_control: FlowControlConfig,
    /// Read loop tick interval
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Upper bound on waiting for the read loop to stop
    #[serde(default = "default_cancel_timeout")]
    pub cancel_timeout_ms: u64,
    /// Timeout passed to the OS serial driver
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
}

/// Activity log line format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_include_timestamp")]
    pub include_timestamp: bool,
    /// chrono format string
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_incoming_prefix")]
    pub incoming_prefix: String,
    #[serde(default = "default_outgoing_prefix")]
    pub outgoing_prefix: String,
}

/// Parity configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    #[default]
    None,
    Odd,
    Even,
}

/// Flow control configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    #[default]
    None,
    Hardware,
    Software,
}

/// Line terminator appended to outgoing text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
    Cr,
    None,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
            LineEnding::Cr => "\r",
            LineEnding::None => "",
        }
    }
}

impl std::fmt::Display for LineEnding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineEnding::Lf => write!(f, "LF"),
            LineEnding::Crlf => write!(f, "CRLF"),
            LineEnding::Cr => write!(f, "CR"),
            LineEnding::None => write!(f, "none"),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_poll_interval() -> u64 {
    100
}

fn default_cancel_timeout() -> u64 {
    2000
}

fn default_read_timeout() -> u64 {
    100
}

fn default_include_timestamp() -> bool {
    true
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S%.6f".to_string()
}

fn default_incoming_prefix() -> String {
    ">>>".to_string()
}

fn default_outgoing_prefix() -> String {
    "<<<".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            line_ending: LineEnding::default(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: ParityConfig::default(),
            flow_control: FlowControlConfig::default(),
            poll_interval_ms: default_poll_interval(),
            cancel_timeout_ms: default_cancel_timeout(),
            read_timeout_ms: default_read_timeout(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            include_timestamp: default_include_timestamp(),
            timestamp_format: default_timestamp_format(),
            incoming_prefix: default_incoming_prefix(),
            outgoing_prefix: default_outgoing_prefix(),
        }
    }
}

impl ConnectionDefaults {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn cancel_timeout(&self) -> Duration {
        Duration::from_millis(self.cancel_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl SerViewConfig {
    /// Reject values the serial driver or the read loop cannot work with
    pub fn validate(&self) -> SerViewResult<()> {
        let conn = &self.connection;
        if conn.baud_rate == 0 {
            return Err(SerViewError::config("baud_rate must be greater than zero"));
        }
        if !(5..=8).contains(&conn.data_bits) {
            return Err(SerViewError::config(format!(
                "Invalid data bits: {}",
                conn.data_bits
            )));
        }
        if !(1..=2).contains(&conn.stop_bits) {
            return Err(SerViewError::config(format!(
                "Invalid stop bits: {}",
                conn.stop_bits
            )));
        }
        if conn.poll_interval_ms == 0 {
            return Err(SerViewError::config("poll_interval_ms must be greater than zero"));
        }
        if conn.cancel_timeout_ms == 0 {
            return Err(SerViewError::config("cancel_timeout_ms must be greater than zero"));
        }
        if StrftimeItems::new(&self.display.timestamp_format).any(|item| item == Item::Error) {
            return Err(SerViewError::config(format!(
                "Invalid timestamp format: {}",
                self.display.timestamp_format
            )));
        }
        Ok(())
    }
}
