// Logging module - Logging infrastructure
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::domain::error::{SerViewError, SerViewResult};

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    /// Discard everything; used while the terminal UI owns the screen
    Discard,
}

/// Filter directive for a configured level, `-v` forcing debug
pub fn filter_directive(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    format!("serview={},warn", level)
}

/// Initialize logging system. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str, verbose: bool, target: LogTarget<'_>) -> SerViewResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level, verbose)));

    let (writer, ansi) = match target {
        LogTarget::Stderr => (BoxMakeWriter::new(io::stderr), true),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    SerViewError::config(format!("Failed to open log file {}: {}", path.display(), e))
                })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        LogTarget::Discard => (BoxMakeWriter::new(io::sink), false),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true),
        )
        .try_init()
        .map_err(|e| SerViewError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!("SerView logging system initialized");
    Ok(())
}
