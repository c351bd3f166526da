// Serial module - Device handles and port discovery
pub mod device;
pub mod discovery;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use device::{DeviceHandle, DeviceOpener, SerialSettings, SystemOpener};
pub use discovery::{PortDiscovery, SerialPortDescriptor};
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockDevice, MockOpener};
