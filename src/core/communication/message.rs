use chrono::{DateTime, Local};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::config::DisplayConfig;

/// Direction of a logged message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageDirection {
    /// Data received from device
    Incoming,
    /// Data sent to device
    Outgoing,
}

impl std::fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageDirection::Incoming => write!(f, "incoming"),
            MessageDirection::Outgoing => write!(f, "outgoing"),
        }
    }
}

/// One logged chunk of traffic. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub direction: MessageDirection,
    pub payload: String,
}

impl LogEntry {
    pub fn new(direction: MessageDirection, payload: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            direction,
            payload: payload.into(),
        }
    }

    pub fn incoming(payload: impl Into<String>) -> Self {
        Self::new(MessageDirection::Incoming, payload)
    }

    pub fn outgoing(payload: impl Into<String>) -> Self {
        Self::new(MessageDirection::Outgoing, payload)
    }

    /// Prefix configured for this entry's direction
    pub fn prefix<'a>(&self, display: &'a DisplayConfig) -> &'a str {
        match self.direction {
            MessageDirection::Incoming => &display.incoming_prefix,
            MessageDirection::Outgoing => &display.outgoing_prefix,
        }
    }

    /// Render as `<timestamp> <prefix> <payload>`
    pub fn format_line(&self, display: &DisplayConfig) -> String {
        let prefix = self.prefix(display);
        if display.include_timestamp {
            format!(
                "{} {} {}",
                self.timestamp.format(&display.timestamp_format),
                prefix,
                self.payload
            )
        } else {
            format!("{} {}", prefix, self.payload)
        }
    }
}

/// Ordered, append-only record of traffic shared between the read loop, the
/// send path and any number of observers.
///
/// Cloning yields another handle to the same log.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, entry: LogEntry) {
        self.entries.write().push(entry);
    }

    /// Discard all entries. Independent of connection state.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Copy of the log as of this call
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.read().clone()
    }

    /// Entries from `start` onward; empty when `start` is past the end
    pub fn snapshot_from(&self, start: usize) -> Vec<LogEntry> {
        let entries = self.entries.read();
        entries.get(start..).map(<[LogEntry]>::to_vec).unwrap_or_default()
    }

    /// Raw payloads in order, newline-separated
    pub fn export_text(&self) -> String {
        self.entries
            .read()
            .iter()
            .map(|entry| entry.payload.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_entry_constructors() {
        let sent = LogEntry::outgoing("hello");
        assert_eq!(sent.direction, MessageDirection::Outgoing);
        assert_eq!(sent.payload, "hello");

        let received = LogEntry::incoming("world");
        assert_eq!(received.direction, MessageDirection::Incoming);
    }

    #[test]
    fn test_format_line() {
        let display = DisplayConfig::default();
        let line = LogEntry::incoming("OK").format_line(&display);
        assert!(line.ends_with(">>> OK"));

        let display = DisplayConfig {
            include_timestamp: false,
            ..DisplayConfig::default()
        };
        assert_eq!(LogEntry::outgoing("AT").format_line(&display), "<<< AT");
    }

    #[test]
    fn test_snapshot_is_stable() {
        let log = MessageLog::new();
        log.append(LogEntry::incoming("a"));
        let snapshot = log.snapshot();
        log.append(LogEntry::incoming("b"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_clear_and_export() {
        let log = MessageLog::new();
        assert_eq!(log.export_text(), "");

        log.append(LogEntry::outgoing("AT"));
        log.append(LogEntry::incoming("OK"));
        assert_eq!(log.export_text(), "AT\nOK");

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.export_text(), "");
    }

    #[test]
    fn test_snapshot_from() {
        let log = MessageLog::new();
        for payload in ["a", "b", "c"] {
            log.append(LogEntry::incoming(payload));
        }
        let tail: Vec<_> = log.snapshot_from(1).into_iter().map(|e| e.payload).collect();
        assert_eq!(tail, vec!["b", "c"]);
        assert!(log.snapshot_from(3).is_empty());
        assert!(log.snapshot_from(10).is_empty());
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let log = MessageLog::new();
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        log.append(LogEntry::incoming(format!("{}-{}", w, i)));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 1000);
        // Per-writer order survives interleaving
        for w in 0..4 {
            let prefix = format!("{}-", w);
            let seq: Vec<usize> = snapshot
                .iter()
                .filter_map(|e| e.payload.strip_prefix(&prefix))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..250).collect::<Vec<_>>());
        }
    }

    proptest! {
        #[test]
        fn prop_export_preserves_insertion_order(payloads in proptest::collection::vec("[a-zA-Z0-9 ]{0,12}", 0..32)) {
            let log = MessageLog::new();
            for (i, payload) in payloads.iter().enumerate() {
                if i % 2 == 0 {
                    log.append(LogEntry::incoming(payload.clone()));
                } else {
                    log.append(LogEntry::outgoing(payload.clone()));
                }
            }
            prop_assert_eq!(log.export_text(), payloads.join("\n"));
            let snapshot: Vec<String> = log.snapshot().into_iter().map(|e| e.payload).collect();
            prop_assert_eq!(snapshot, payloads);
        }
    }
}
