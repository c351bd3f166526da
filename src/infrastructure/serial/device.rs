use crate::domain::config::{ConnectionDefaults, FlowControlConfig, ParityConfig};
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Open device handle consumed by the connection manager and the read loop.
///
/// Implementations must make `close` idempotent; any call after it returns an
/// error instead of touching the OS resource.
pub trait DeviceHandle: Send {
    /// Number of bytes buffered by the driver and ready to be read.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read up to `n` bytes.
    fn read(&mut self, n: usize) -> io::Result<Vec<u8>>;

    /// Single write call; returns how many bytes the device accepted.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    fn close(&mut self);
}

/// Opens device handles by path.
pub trait DeviceOpener: Send + Sync {
    fn open(&self, path: &str, baud_rate: u32) -> Result<Box<dyn DeviceHandle>, serialport::Error>;
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "device handle is closed")
}

/// Line settings applied when opening a real port
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: ParityConfig,
    pub flow_control: FlowControlConfig,
    pub timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self::from(&ConnectionDefaults::default())
    }
}

impl From<&ConnectionDefaults> for SerialSettings {
    fn from(defaults: &ConnectionDefaults) -> Self {
        Self {
            data_bits: defaults.data_bits,
            stop_bits: defaults.stop_bits,
            parity: defaults.parity,
            flow_control: defaults.flow_control,
            timeout: defaults.read_timeout(),
        }
    }
}

/// Opens ports through the OS serial driver
#[derive(Debug, Clone, Default)]
pub struct SystemOpener {
    settings: SerialSettings,
}

impl SystemOpener {
    pub fn new(settings: SerialSettings) -> Self {
        Self { settings }
    }
}

impl DeviceOpener for SystemOpener {
    fn open(&self, path: &str, baud_rate: u32) -> Result<Box<dyn DeviceHandle>, serialport::Error> {
        let s = &self.settings;
        let invalid = |what: &str, value: u8| {
            serialport::Error::new(
                serialport::ErrorKind::InvalidInput,
                format!("Invalid {}: {}", what, value),
            )
        };

        let data_bits = match s.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => return Err(invalid("data bits", other)),
        };

        let stop_bits = match s.stop_bits {
            1 => serialport::StopBits::One,
            2 => serialport::StopBits::Two,
            other => return Err(invalid("stop bits", other)),
        };

        let parity = match s.parity {
            ParityConfig::None => serialport::Parity::None,
            ParityConfig::Even => serialport::Parity::Even,
            ParityConfig::Odd => serialport::Parity::Odd,
        };

        let flow_control = match s.flow_control {
            FlowControlConfig::None => serialport::FlowControl::None,
            FlowControlConfig::Software => serialport::FlowControl::Software,
            FlowControlConfig::Hardware => serialport::FlowControl::Hardware,
        };

        let port = serialport::new(path, baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .flow_control(flow_control)
            .timeout(s.timeout)
            .open()?;

        info!("Serial port '{}' opened at {} baud", path, baud_rate);

        Ok(Box::new(SerialDevice {
            name: path.to_string(),
            port: Some(port),
        }))
    }
}

/// Handle backed by a `serialport` port. Dropping the inner port closes the
/// OS file descriptor.
pub struct SerialDevice {
    name: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialDevice {
    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or_else(closed_error)
    }
}

impl DeviceHandle for SerialDevice {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let n = self.port()?.bytes_to_read().map_err(io::Error::from)?;
        Ok(n as usize)
    }

    fn read(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buffer = vec![0u8; n];
        let read = self.port()?.read(&mut buffer)?;
        buffer.truncate(read);
        Ok(buffer)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let written = self.port()?.write(bytes)?;
        debug!("Wrote {} of {} bytes to '{}'", written, bytes.len(), self.name);
        Ok(written)
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!("Serial port '{}' closed", self.name);
        }
    }
}

impl Drop for SerialDevice {
    fn drop(&mut self) {
        self.close();
    }
}
