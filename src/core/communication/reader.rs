use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error};

use super::message::{LogEntry, MessageLog};
use super::task::CancelSignal;
use crate::infrastructure::serial::DeviceHandle;

/// Device handle shared between the connection owner and its read loop
pub type SharedHandle = Arc<Mutex<Box<dyn DeviceHandle>>>;

/// Why the read loop returned
#[derive(Debug)]
pub enum ReadLoopExit {
    Cancelled,
    Faulted(io::Error),
}

/// Polls the device for inbound bytes and appends each non-empty chunk to the
/// message log as one incoming entry.
pub struct ReadLoop {
    port_name: String,
    handle: SharedHandle,
    log: MessageLog,
    poll_interval: Duration,
}

impl ReadLoop {
    pub fn new(port_name: impl Into<String>, handle: SharedHandle, log: MessageLog, poll_interval: Duration) -> Self {
        Self {
            port_name: port_name.into(),
            handle,
            log,
            poll_interval,
        }
    }

    pub async fn run(self, mut cancel: CancelSignal) -> ReadLoopExit {
        debug!("Read loop started for '{}'", self.port_name);
        loop {
            if cancel.is_cancelled() {
                break;
            }

            if let Err(e) = self.tick().await {
                error!("Read from '{}' failed: {}", self.port_name, e);
                return ReadLoopExit::Faulted(e);
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
        debug!("Read loop for '{}' acknowledged cancellation", self.port_name);
        ReadLoopExit::Cancelled
    }

    /// One polling step. Returns the number of bytes logged.
    pub async fn tick(&self) -> io::Result<usize> {
        let data = {
            let mut handle = self.handle.lock().await;
            let available = handle.bytes_available()?;
            if available == 0 {
                return Ok(0);
            }
            handle.read(available)?
        };

        if data.is_empty() {
            return Ok(0);
        }

        debug!("Received {} bytes from '{}'", data.len(), self.port_name);
        let text = String::from_utf8_lossy(&data).into_owned();
        self.log.append(LogEntry::incoming(text));
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::communication::message::MessageDirection;
    use crate::core::communication::task::CancellableTask;
    use crate::infrastructure::serial::MockDevice;

    fn shared(device: &MockDevice) -> SharedHandle {
        let handle: Box<dyn DeviceHandle> = Box::new(device.clone());
        Arc::new(Mutex::new(handle))
    }

    #[tokio::test]
    async fn test_ticks_log_only_nonempty_chunks() {
        let device = MockDevice::new();
        device.script_ticks([&b"AB"[..], &b""[..], &b"CD"[..]]);
        let log = MessageLog::new();
        let reader = ReadLoop::new("mock", shared(&device), log.clone(), Duration::from_millis(10));

        assert_eq!(reader.tick().await.unwrap(), 2);
        assert_eq!(reader.tick().await.unwrap(), 0);
        assert_eq!(reader.tick().await.unwrap(), 2);

        let entries = log.snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].payload, "AB");
        assert_eq!(entries[1].payload, "CD");
        assert!(entries.iter().all(|e| e.direction == MessageDirection::Incoming));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let device = MockDevice::new();
        device.feed(&[b'o', b'k', 0xFF, b'!']);
        let log = MessageLog::new();
        let reader = ReadLoop::new("mock", shared(&device), log.clone(), Duration::from_millis(10));

        reader.tick().await.unwrap();
        assert_eq!(log.snapshot()[0].payload, "ok\u{FFFD}!");
    }

    #[tokio::test]
    async fn test_query_failure_faults_loop() {
        let device = MockDevice::new();
        device.fail_reads(io::ErrorKind::BrokenPipe);
        let reader = ReadLoop::new("mock", shared(&device), MessageLog::new(), Duration::from_millis(10));

        let task = CancellableTask::spawn(|signal| reader.run(signal));
        let exit = task.await_stopped(Duration::from_secs(1)).await.unwrap();
        match exit {
            ReadLoopExit::Faulted(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected exit: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_stops_polling() {
        let device = MockDevice::new();
        let reader = ReadLoop::new("mock", shared(&device), MessageLog::new(), Duration::from_millis(5));

        let task = CancellableTask::spawn(|signal| reader.run(signal));
        tokio::time::sleep(Duration::from_millis(30)).await;
        task.request_cancel();
        let exit = task.await_stopped(Duration::from_secs(1)).await.unwrap();
        assert!(matches!(exit, ReadLoopExit::Cancelled));

        let queries = device.availability_queries();
        assert!(queries > 0);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(device.availability_queries(), queries);
    }
}
