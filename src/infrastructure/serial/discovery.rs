//! Serial port discovery
//!
//! Enumerates the ports the OS currently exposes. Discovery never touches an
//! open handle, so it is safe to call while a connection is active.

use serde::Serialize;
use serialport::{SerialPortInfo, SerialPortType};
use tracing::{debug, warn};

/// Immutable description of one serial device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialPortDescriptor {
    /// Device path (e.g. /dev/ttyUSB0, COM3)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Hardware identifier
    pub hardware_id: String,
}

const NOT_AVAILABLE: &str = "n/a";

impl SerialPortDescriptor {
    /// Descriptor for a path supplied directly by the user
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            name: path.into(),
            description: NOT_AVAILABLE.to_string(),
            hardware_id: NOT_AVAILABLE.to_string(),
        }
    }

    fn from_port_info(info: SerialPortInfo) -> Self {
        let (description, hardware_id) = match &info.port_type {
            SerialPortType::UsbPort(usb) => {
                let description = usb
                    .product
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                let mut hwid = format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid);
                if let Some(serial) = &usb.serial_number {
                    hwid.push_str(&format!(" SER={}", serial));
                }
                (description, hwid)
            }
            SerialPortType::PciPort => ("PCI device".to_string(), "PCI".to_string()),
            SerialPortType::BluetoothPort => {
                ("Bluetooth device".to_string(), "BLUETOOTH".to_string())
            }
            SerialPortType::Unknown => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        };

        Self {
            name: info.port_name,
            description,
            hardware_id,
        }
    }
}

type Enumerator = Box<dyn Fn() -> serialport::Result<Vec<SerialPortInfo>> + Send + Sync>;

/// Port discovery backed by an OS enumerator
pub struct PortDiscovery {
    enumerate: Enumerator,
}

impl PortDiscovery {
    /// Discovery against the OS device inventory
    pub fn system() -> Self {
        Self::with_enumerator(serialport::available_ports)
    }

    pub fn with_enumerator<F>(enumerate: F) -> Self
    where
        F: Fn() -> serialport::Result<Vec<SerialPortInfo>> + Send + Sync + 'static,
    {
        Self {
            enumerate: Box::new(enumerate),
        }
    }

    /// List currently visible ports. An enumeration failure is logged and
    /// reported as an empty list.
    pub fn list_ports(&self) -> Vec<SerialPortDescriptor> {
        match (self.enumerate)() {
            Ok(ports) => {
                let ports: Vec<_> = ports
                    .into_iter()
                    .map(SerialPortDescriptor::from_port_info)
                    .collect();
                debug!("Discovered {} serial port(s)", ports.len());
                ports
            }
            Err(e) => {
                warn!("Failed to enumerate serial ports: {}", e);
                Vec::new()
            }
        }
    }
}

impl Default for PortDiscovery {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for PortDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortDiscovery").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb_port(name: &str, serial: Option<&str>) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x0403,
                pid: 0x6001,
                serial_number: serial.map(str::to_string),
                manufacturer: Some("FTDI".to_string()),
                product: Some("FT232R USB UART".to_string()),
            }),
        }
    }

    #[test]
    fn test_usb_descriptor() {
        let descriptor = SerialPortDescriptor::from_port_info(usb_port("/dev/ttyUSB0", Some("A10K")));
        assert_eq!(descriptor.name, "/dev/ttyUSB0");
        assert_eq!(descriptor.description, "FT232R USB UART");
        assert_eq!(descriptor.hardware_id, "USB VID:PID=0403:6001 SER=A10K");
    }

    #[test]
    fn test_usb_descriptor_without_serial() {
        let descriptor = SerialPortDescriptor::from_port_info(usb_port("COM3", None));
        assert_eq!(descriptor.hardware_id, "USB VID:PID=0403:6001");
    }

    #[test]
    fn test_unknown_port_descriptor() {
        let descriptor = SerialPortDescriptor::from_port_info(SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: SerialPortType::Unknown,
        });
        assert_eq!(descriptor.description, "n/a");
        assert_eq!(descriptor.hardware_id, "n/a");
    }

    #[test]
    fn test_empty_inventory_is_not_an_error() {
        let discovery = PortDiscovery::with_enumerator(|| Ok(Vec::new()));
        assert!(discovery.list_ports().is_empty());
    }

    #[test]
    fn test_enumeration_failure_yields_empty_list() {
        let discovery = PortDiscovery::with_enumerator(|| {
            Err(serialport::Error::new(serialport::ErrorKind::Unknown, "udev unavailable"))
        });
        assert!(discovery.list_ports().is_empty());
    }

    #[test]
    fn test_from_path() {
        let descriptor = SerialPortDescriptor::from_path("/dev/ttyACM0");
        assert_eq!(descriptor.name, "/dev/ttyACM0");
        assert_eq!(descriptor.description, "n/a");
    }
}
