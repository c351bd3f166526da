use thiserror::Error;

/// SerView unified error type
#[derive(Error, Debug)]
pub enum SerViewError {
    #[error("Failed to open device '{port}': {source}")]
    DeviceOpen {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Already connected to '{port}'")]
    AlreadyConnected { port: String },

    #[error("Device not connected")]
    NotConnected,

    #[error("Write to device failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("Read from device failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("Read loop did not acknowledge cancellation within {timeout_ms}ms")]
    CancellationTimeout { timeout_ms: u64 },

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal UI error: {0}")]
    Tui(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type SerViewResult<T> = Result<T, SerViewError>;

impl SerViewError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}
