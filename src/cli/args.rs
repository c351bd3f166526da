use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::domain::config::LineEnding;

/// Command line arguments for SerView
#[derive(Parser, Debug)]
#[command(
    name = "serview",
    version = env!("CARGO_PKG_VERSION"),
    about = "Interactive serial device terminal",
    long_about = "Discover serial ports, connect to one device at a time, exchange text lines and keep a timestamped log of all traffic."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Command to execute (defaults to the interactive terminal)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive TUI mode
    Tui,
    /// List available serial ports
    List,
    /// Connect and stream traffic; stdin lines are sent to the device
    Monitor(ConnectArgs),
    /// Connect, send one line, print the replies and disconnect
    Send {
        #[command(flatten)]
        connect: ConnectArgs,
        /// Text to send
        text: String,
        /// How long to collect replies, in milliseconds
        #[arg(long, default_value = "500")]
        wait_ms: u64,
    },
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Connection parameters shared by monitor and send
#[derive(ClapArgs, Debug)]
pub struct ConnectArgs {
    /// Serial port path
    pub port: String,

    /// Baud rate (defaults to the configured rate)
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Line ending appended to sent text (defaults to the configured ending)
    #[arg(short, long, value_enum)]
    pub line_ending: Option<LineEndingArg>,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Create default configuration
    Init {
        /// Directory receiving .serview/config.toml
        #[arg(short, long)]
        output: Option<String>,
        /// Write the global configuration instead
        #[arg(short, long)]
        global: bool,
    },
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
    /// CSV output
    Csv,
}

/// Line ending argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LineEndingArg {
    Lf,
    Crlf,
    Cr,
    None,
}

impl From<LineEndingArg> for LineEnding {
    fn from(arg: LineEndingArg) -> Self {
        match arg {
            LineEndingArg::Lf => Self::Lf,
            LineEndingArg::Crlf => Self::Crlf,
            LineEndingArg::Cr => Self::Cr,
            LineEndingArg::None => Self::None,
        }
    }
}

impl Args {
    /// True when the interactive terminal should run
    pub fn is_tui(&self) -> bool {
        matches!(self.command, None | Some(Command::Tui))
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
