use serde::Serialize;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{oneshot, watch, Mutex};
use tracing::{debug, error, info, warn};

use super::message::{LogEntry, MessageLog};
use super::reader::{ReadLoop, ReadLoopExit, SharedHandle};
use super::task::CancellableTask;
use crate::domain::config::ConnectionDefaults;
use crate::domain::error::{SerViewError, SerViewResult};
use crate::infrastructure::serial::{DeviceOpener, SerialPortDescriptor, SerialSettings, SystemOpener};

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// User-facing operations gated by connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ListPorts,
    Connect,
    Disconnect,
    Send,
    ClearLog,
    ExportLog,
}

impl ConnectionState {
    /// Operations valid in this state
    pub fn allowed_actions(self) -> &'static [Action] {
        match self {
            ConnectionState::Disconnected => &[
                Action::ListPorts,
                Action::Connect,
                Action::ClearLog,
                Action::ExportLog,
            ],
            ConnectionState::Connected => &[
                Action::ListPorts,
                Action::Disconnect,
                Action::Send,
                Action::ClearLog,
                Action::ExportLog,
            ],
        }
    }

    pub fn allows(self, action: Action) -> bool {
        self.allowed_actions().contains(&action)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connected => write!(f, "Connected"),
        }
    }
}

/// Timing of the read loop and of its teardown
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub poll_interval: Duration,
    pub cancel_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::from(&ConnectionDefaults::default())
    }
}

impl From<&ConnectionDefaults> for ConnectionSettings {
    fn from(defaults: &ConnectionDefaults) -> Self {
        Self {
            poll_interval: defaults.poll_interval(),
            cancel_timeout: defaults.cancel_timeout(),
        }
    }
}

struct ActiveConnection {
    id: u64,
    descriptor: SerialPortDescriptor,
    handle: SharedHandle,
    reader: CancellableTask<ReadLoopExit>,
}

impl ActiveConnection {
    /// Cancel the read loop, wait for its acknowledgement, then close the
    /// handle. The handle is closed even when the wait times out.
    async fn shutdown(self, timeout: Duration) -> SerViewResult<()> {
        self.reader.request_cancel();
        let stopped = self.reader.await_stopped(timeout).await;
        self.handle.lock().await.close();
        stopped.map(|_| ())
    }
}

struct Shared {
    opener: Arc<dyn DeviceOpener>,
    log: MessageLog,
    settings: ConnectionSettings,
    active: Mutex<Option<ActiveConnection>>,
    state: watch::Sender<ConnectionState>,
    active_port: parking_lot::RwLock<Option<(SerialPortDescriptor, u32)>>,
    last_fault: parking_lot::Mutex<Option<String>>,
    next_id: AtomicU64,
}

impl Shared {
    /// Caller must hold the `active` lock for the duration.
    async fn teardown(&self, conn: ActiveConnection) -> SerViewResult<()> {
        let port = conn.descriptor.name.clone();
        let result = conn.shutdown(self.settings.cancel_timeout).await;
        *self.active_port.write() = None;
        self.state.send_replace(ConnectionState::Disconnected);
        match &result {
            Ok(()) => info!("Disconnected from '{}'", port),
            Err(e) => warn!("Unclean teardown of '{}': {}", port, e),
        }
        result
    }

    async fn force_disconnect(&self, id: u64, reason: String) {
        let mut active = self.active.lock().await;
        if active.as_ref().map(|conn| conn.id) != Some(id) {
            return;
        }
        let Some(conn) = active.take() else {
            return;
        };

        error!("Connection to '{}' lost: {}", conn.descriptor.name, reason);
        *self.last_fault.lock() = Some(format!("{}: {}", conn.descriptor.name, reason));
        if let Err(e) = self.teardown(conn).await {
            warn!("Forced disconnect did not complete cleanly: {}", e);
        }
    }
}

/// Owns the single active connection and its read loop.
///
/// Cloning yields another handle to the same manager.
#[derive(Clone)]
pub struct ConnectionManager {
    shared: Arc<Shared>,
}

impl ConnectionManager {
    pub fn new(opener: Arc<dyn DeviceOpener>, log: MessageLog, settings: ConnectionSettings) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                opener,
                log,
                settings,
                active: Mutex::new(None),
                state,
                active_port: parking_lot::RwLock::new(None),
                last_fault: parking_lot::Mutex::new(None),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Manager backed by the operating system's serial driver, with a fresh log
    pub fn system(defaults: &ConnectionDefaults) -> Self {
        let opener = SystemOpener::new(SerialSettings::from(defaults));
        Self::new(Arc::new(opener), MessageLog::new(), ConnectionSettings::from(defaults))
    }

    /// Current state; never blocks
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// Receiver notified on every state transition
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    pub fn log(&self) -> &MessageLog {
        &self.shared.log
    }

    /// Descriptor and baud rate of the active connection
    pub fn active_port(&self) -> Option<(SerialPortDescriptor, u32)> {
        self.shared.active_port.read().clone()
    }

    /// Diagnostic of the most recent forced disconnect
    pub fn last_fault(&self) -> Option<String> {
        self.shared.last_fault.lock().clone()
    }

    pub async fn connect(&self, descriptor: &SerialPortDescriptor, baud_rate: u32) -> SerViewResult<()> {
        if baud_rate == 0 {
            return Err(SerViewError::InvalidInput(
                "baud rate must be greater than zero".to_string(),
            ));
        }

        let mut active = self.shared.active.lock().await;
        if let Some(conn) = active.as_ref() {
            return Err(SerViewError::AlreadyConnected {
                port: conn.descriptor.name.clone(),
            });
        }

        let handle = self
            .shared
            .opener
            .open(&descriptor.name, baud_rate)
            .map_err(|source| SerViewError::DeviceOpen {
                port: descriptor.name.clone(),
                source,
            })?;
        let handle: SharedHandle = Arc::new(Mutex::new(handle));
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed) + 1;

        let reader = ReadLoop::new(
            descriptor.name.clone(),
            Arc::clone(&handle),
            self.shared.log.clone(),
            self.shared.settings.poll_interval,
        );
        let (fault_tx, fault_rx) = oneshot::channel::<String>();
        let task = CancellableTask::spawn(move |signal| async move {
            let exit = reader.run(signal).await;
            if let ReadLoopExit::Faulted(e) = &exit {
                let _ = fault_tx.send(e.to_string());
            }
            exit
        });
        spawn_fault_watch(Arc::downgrade(&self.shared), id, fault_rx);

        *active = Some(ActiveConnection {
            id,
            descriptor: descriptor.clone(),
            handle,
            reader: task,
        });
        *self.shared.active_port.write() = Some((descriptor.clone(), baud_rate));
        *self.shared.last_fault.lock() = None;
        self.shared.state.send_replace(ConnectionState::Connected);

        info!("Connected to '{}' at {} baud", descriptor.name, baud_rate);
        Ok(())
    }

    /// Stop the read loop, close the handle and return to `Disconnected`.
    /// Succeeds trivially when already disconnected.
    pub async fn disconnect(&self) -> SerViewResult<()> {
        let mut active = self.shared.active.lock().await;
        let Some(conn) = active.take() else {
            debug!("Disconnect requested while disconnected");
            return Ok(());
        };
        self.shared.teardown(conn).await
    }

    /// Write `text` followed by `line_terminator` in a single call and log
    /// the text once the device has accepted every byte.
    pub async fn send(&self, text: &str, line_terminator: &str) -> SerViewResult<()> {
        let active = self.shared.active.lock().await;
        let conn = active.as_ref().ok_or(SerViewError::NotConnected)?;

        let mut line = String::with_capacity(text.len() + line_terminator.len());
        line.push_str(text);
        line.push_str(line_terminator);
        let bytes = line.into_bytes();

        // Held until the entry is logged so the read loop cannot log a reply
        // ahead of the request that caused it
        let mut handle = conn.handle.lock().await;
        let written = handle.write(&bytes).map_err(SerViewError::Write)?;
        if written != bytes.len() {
            return Err(SerViewError::Write(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", written, bytes.len()),
            )));
        }

        self.shared.log.append(LogEntry::outgoing(text));
        drop(handle);
        debug!("Sent {} bytes to '{}'", written, conn.descriptor.name);
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .field("active_port", &self.active_port())
            .finish()
    }
}

/// Turns a read loop fault into a forced disconnect of that connection.
///
/// A dropped sender without a fault means the loop died (panicked) without
/// reporting; that is treated as a fault too. After a regular `disconnect`
/// the id no longer matches and nothing happens.
fn spawn_fault_watch(shared: Weak<Shared>, id: u64, fault_rx: oneshot::Receiver<String>) {
    tokio::spawn(async move {
        let reason = fault_rx
            .await
            .unwrap_or_else(|_| "read loop stopped unexpectedly".to_string());
        if let Some(shared) = shared.upgrade() {
            shared.force_disconnect(id, reason).await;
        }
    });
}
