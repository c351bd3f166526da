//! Scripted in-memory device for exercising the connection lifecycle without
//! hardware.
//!
//! Every operation performed after `close` is counted, so lifecycle tests can
//! assert that no handle is touched once it has been released.

use super::device::{DeviceHandle, DeviceOpener};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct MockDeviceState {
    /// Bytes ready to be read
    rx: VecDeque<u8>,
    /// Per-tick arrivals, staged into `rx` one step per availability query
    script: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
    closed: bool,
    close_calls: usize,
    accesses_after_close: usize,
    availability_queries: usize,
    read_error: Option<io::ErrorKind>,
    write_error: Option<io::ErrorKind>,
    short_writes: bool,
    echo: bool,
    panic_on_query: bool,
    read_delay: Duration,
}

/// Cloneable handle to a shared mock device state
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<MockDeviceState>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make bytes available immediately
    pub fn feed(&self, data: &[u8]) {
        self.state.lock().rx.extend(data);
    }

    /// Queue arrivals tick by tick; an empty step is a tick with nothing
    /// available
    pub fn script_ticks<I, B>(&self, steps: I)
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut state = self.state.lock();
        state
            .script
            .extend(steps.into_iter().map(|step| step.as_ref().to_vec()));
    }

    /// Fail every subsequent query and read with `kind`
    pub fn fail_reads(&self, kind: io::ErrorKind) {
        self.state.lock().read_error = Some(kind);
    }

    /// Fail every subsequent write with `kind`
    pub fn fail_writes(&self, kind: io::ErrorKind) {
        self.state.lock().write_error = Some(kind);
    }

    /// Accept one byte less than requested on every write
    pub fn short_writes(&self, enabled: bool) {
        self.state.lock().short_writes = enabled;
    }

    /// Loop every accepted write back as inbound bytes
    pub fn echo_writes(&self, enabled: bool) {
        self.state.lock().echo = enabled;
    }

    /// Panic on the next availability query, as a buggy driver would
    pub fn panic_on_query(&self) {
        self.state.lock().panic_on_query = true;
    }

    /// Block every read call for `delay`, simulating an in-flight tick
    pub fn set_read_delay(&self, delay: Duration) {
        self.state.lock().read_delay = delay;
    }

    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().close_calls
    }

    pub fn accesses_after_close(&self) -> usize {
        self.state.lock().accesses_after_close
    }

    pub fn availability_queries(&self) -> usize {
        self.state.lock().availability_queries
    }

    fn guard_open(state: &mut MockDeviceState) -> io::Result<()> {
        if state.closed {
            state.accesses_after_close += 1;
            return Err(io::Error::new(io::ErrorKind::NotConnected, "mock device is closed"));
        }
        Ok(())
    }
}

impl DeviceHandle for MockDevice {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let mut state = self.state.lock();
        Self::guard_open(&mut state)?;
        state.availability_queries += 1;
        if state.panic_on_query {
            drop(state);
            panic!("mock device driver fault");
        }
        if let Some(kind) = state.read_error {
            return Err(io::Error::new(kind, "mock query failure"));
        }
        if state.rx.is_empty() {
            if let Some(step) = state.script.pop_front() {
                state.rx.extend(step);
            }
        }
        Ok(state.rx.len())
    }

    fn read(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let delay = {
            let mut state = self.state.lock();
            Self::guard_open(&mut state)?;
            state.read_delay
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut state = self.state.lock();
        Self::guard_open(&mut state)?;
        if let Some(kind) = state.read_error {
            return Err(io::Error::new(kind, "mock read failure"));
        }
        let take = n.min(state.rx.len());
        Ok(state.rx.drain(..take).collect())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        Self::guard_open(&mut state)?;
        if let Some(kind) = state.write_error {
            return Err(io::Error::new(kind, "mock write failure"));
        }
        let accepted = if state.short_writes {
            bytes.len().saturating_sub(1)
        } else {
            bytes.len()
        };
        state.written.push(bytes[..accepted].to_vec());
        if state.echo {
            state.rx.extend(&bytes[..accepted]);
        }
        Ok(accepted)
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        state.close_calls += 1;
        state.closed = true;
    }
}

#[derive(Debug, Default)]
struct MockOpenerState {
    queued: VecDeque<MockDevice>,
    opened: Vec<(String, u32, MockDevice)>,
    open_error: Option<serialport::ErrorKind>,
}

/// Opener handing out mock devices and recording every open
#[derive(Debug, Clone, Default)]
pub struct MockOpener {
    state: Arc<Mutex<MockOpenerState>>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opener whose next open returns `device`
    pub fn with_device(device: MockDevice) -> Self {
        let opener = Self::new();
        opener.push_device(device);
        opener
    }

    /// Device to hand out on a future open; fresh devices are created once
    /// the queue is empty
    pub fn push_device(&self, device: MockDevice) {
        self.state.lock().queued.push_back(device);
    }

    /// Make every subsequent open fail
    pub fn fail_with(&self, kind: serialport::ErrorKind) {
        self.state.lock().open_error = Some(kind);
    }

    pub fn succeed(&self) {
        self.state.lock().open_error = None;
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().opened.len()
    }

    pub fn last_device(&self) -> Option<MockDevice> {
        self.state.lock().opened.last().map(|(_, _, device)| device.clone())
    }

    pub fn devices(&self) -> Vec<MockDevice> {
        self.state
            .lock()
            .opened
            .iter()
            .map(|(_, _, device)| device.clone())
            .collect()
    }

    /// Path and baud rate of every successful open
    pub fn opened(&self) -> Vec<(String, u32)> {
        self.state
            .lock()
            .opened
            .iter()
            .map(|(path, baud, _)| (path.clone(), *baud))
            .collect()
    }
}

impl DeviceOpener for MockOpener {
    fn open(&self, path: &str, baud_rate: u32) -> Result<Box<dyn DeviceHandle>, serialport::Error> {
        let mut state = self.state.lock();
        if let Some(kind) = state.open_error {
            return Err(serialport::Error::new(kind, format!("cannot open {}", path)));
        }
        let device = state.queued.pop_front().unwrap_or_default();
        state.opened.push((path.to_string(), baud_rate, device.clone()));
        Ok(Box::new(device))
    }
}
