use crate::cli::args::OutputFormat;
use crate::core::communication::LogEntry;
use crate::domain::config::{DisplayConfig, SerViewConfig};
use crate::infrastructure::serial::SerialPortDescriptor;
use std::io;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_ports(&self, ports: &[SerialPortDescriptor]) -> Result<(), OutputError>;
    fn write_entries(&self, entries: &[LogEntry], display: &DisplayConfig) -> Result<(), OutputError>;
    fn write_config(&self, config: &SerViewConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::SerViewError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_ports(&self, ports: &[SerialPortDescriptor]) -> Result<(), OutputError> {
        print!("{}", render_ports(self.format, ports)?);
        Ok(())
    }

    fn write_entries(&self, entries: &[LogEntry], display: &DisplayConfig) -> Result<(), OutputError> {
        print!("{}", render_entries(self.format, entries, display)?);
        Ok(())
    }

    fn write_config(&self, config: &SerViewConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            _ => print!("{}", toml::to_string_pretty(config)?),
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "message": message,
                    "level": "info"
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                println!("{}", message);
            }
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "error": error,
                    "level": "error"
                });
                eprintln!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}

/// Table row for a discovered port
#[derive(Tabled)]
struct PortTableRow {
    port: String,
    description: String,
    hwid: String,
}

impl From<&SerialPortDescriptor> for PortTableRow {
    fn from(port: &SerialPortDescriptor) -> Self {
        Self {
            port: port.name.clone(),
            description: port.description.clone(),
            hwid: port.hardware_id.clone(),
        }
    }
}

/// Table row for a log entry
#[derive(Tabled)]
struct EntryTableRow {
    time: String,
    direction: String,
    payload: String,
}

fn render_ports(format: OutputFormat, ports: &[SerialPortDescriptor]) -> Result<String, OutputError> {
    let out = match format {
        OutputFormat::Text => {
            if ports.is_empty() {
                "No serial ports found\n".to_string()
            } else {
                ports
                    .iter()
                    .map(|port| format!("{}\t{}\t{}\n", port.name, port.description, port.hardware_id))
                    .collect()
            }
        }
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(ports)?),
        OutputFormat::Table => {
            if ports.is_empty() {
                String::new()
            } else {
                let rows: Vec<PortTableRow> = ports.iter().map(PortTableRow::from).collect();
                format!("{}\n", Table::new(rows))
            }
        }
        OutputFormat::Csv => {
            let mut csv = "port,description,hwid\n".to_string();
            for port in ports {
                csv.push_str(&format!(
                    "{},{},{}\n",
                    csv_field(&port.name),
                    csv_field(&port.description),
                    csv_field(&port.hardware_id)
                ));
            }
            csv
        }
    };
    Ok(out)
}

fn render_entries(
    format: OutputFormat,
    entries: &[LogEntry],
    display: &DisplayConfig,
) -> Result<String, OutputError> {
    let out = match format {
        OutputFormat::Text => entries
            .iter()
            .map(|entry| format!("{}\n", entry.format_line(display)))
            .collect(),
        // One object per line so a streaming consumer can parse incrementally
        OutputFormat::Json => {
            let mut out = String::new();
            for entry in entries {
                out.push_str(&serde_json::to_string(entry)?);
                out.push('\n');
            }
            out
        }
        OutputFormat::Table => {
            if entries.is_empty() {
                String::new()
            } else {
                let rows: Vec<EntryTableRow> = entries
                    .iter()
                    .map(|entry| EntryTableRow {
                        time: entry.timestamp.format(&display.timestamp_format).to_string(),
                        direction: entry.direction.to_string(),
                        payload: entry.payload.clone(),
                    })
                    .collect();
                format!("{}\n", Table::new(rows))
            }
        }
        OutputFormat::Csv => entries
            .iter()
            .map(|entry| {
                format!(
                    "{},{},{}\n",
                    entry.timestamp.to_rfc3339(),
                    entry.direction,
                    csv_field(&entry.payload)
                )
            })
            .collect(),
    };
    Ok(out)
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports() -> Vec<SerialPortDescriptor> {
        vec![SerialPortDescriptor {
            name: "/dev/ttyUSB0".to_string(),
            description: "CP2102 USB to UART".to_string(),
            hardware_id: "USB VID:PID=10C4:EA60 SER=0001".to_string(),
        }]
    }

    #[test]
    fn test_render_ports_formats() {
        let text = render_ports(OutputFormat::Text, &ports()).unwrap();
        assert!(text.starts_with("/dev/ttyUSB0\tCP2102 USB to UART\t"));

        let json = render_ports(OutputFormat::Json, &ports()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "/dev/ttyUSB0");

        let table = render_ports(OutputFormat::Table, &ports()).unwrap();
        assert!(table.contains("hwid"));
        assert!(table.contains("10C4:EA60"));

        let csv = render_ports(OutputFormat::Csv, &ports()).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_render_no_ports() {
        assert_eq!(render_ports(OutputFormat::Text, &[]).unwrap(), "No serial ports found\n");
        assert_eq!(render_ports(OutputFormat::Csv, &[]).unwrap(), "port,description,hwid\n");
    }

    #[test]
    fn test_render_entries_text_uses_prefixes() {
        let display = DisplayConfig {
            include_timestamp: false,
            ..DisplayConfig::default()
        };
        let entries = vec![LogEntry::outgoing("AT"), LogEntry::incoming("OK")];
        let text = render_entries(OutputFormat::Text, &entries, &display).unwrap();
        assert_eq!(text, "<<< AT\n>>> OK\n");
    }

    #[test]
    fn test_render_entries_json_lines() {
        let entries = vec![LogEntry::incoming("a"), LogEntry::incoming("b")];
        let json = render_entries(OutputFormat::Json, &entries, &DisplayConfig::default()).unwrap();
        let lines: Vec<_> = json.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["direction"], "Incoming");
        assert_eq!(first["payload"], "a");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
