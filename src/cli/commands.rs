use crate::cli::args::{Args, Command, ConfigArgs, ConfigCommand, ConnectArgs};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::communication::{ConnectionManager, ConnectionState};
use crate::domain::config::{LineEnding, SerViewConfig};
use crate::domain::error::{SerViewError, SerViewResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::{init_logging, LogTarget};
use crate::infrastructure::serial::{PortDiscovery, SerialPortDescriptor};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Load the effective configuration, honouring an explicit `--config` path
pub fn load_configuration(config_path: Option<&str>) -> SerViewResult<(ConfigManager, SerViewConfig)> {
    let config_manager = ConfigManager::new()?;
    let config = match config_path {
        Some(path) => config_manager.load_config_from_path(path.as_ref())?,
        None => config_manager.load_config()?,
    };
    Ok((config_manager, config))
}

/// Execute CLI command
pub async fn execute_command(args: Args) -> SerViewResult<()> {
    let writer = ConsoleWriter::new(args.output);
    let (config_manager, config) = load_configuration(args.config.as_deref())?;

    if !args.quiet {
        init_logging(&config.global.log_level, args.verbose, LogTarget::Stderr)?;
    }

    match args.command {
        None | Some(Command::Tui) => Err(SerViewError::InvalidInput(
            "the terminal UI is started without a command".to_string(),
        )),
        Some(Command::List) => {
            let ports = PortDiscovery::system().list_ports();
            writer.write_ports(&ports)?;
            Ok(())
        }
        Some(Command::Monitor(connect)) => execute_monitor(connect, &writer, &config).await,
        Some(Command::Send { connect, text, wait_ms }) => {
            execute_send(connect, &text, wait_ms, &writer, &config).await
        }
        Some(Command::Config(config_args)) => {
            execute_config_command(config_args, &writer, &config, &config_manager)
        }
        Some(Command::Version) => {
            writer.write_message(&format!("serview {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

/// Prefer the enumerated descriptor so its description and hwid are kept
fn resolve_port(discovery: &PortDiscovery, name: &str) -> SerialPortDescriptor {
    discovery
        .list_ports()
        .into_iter()
        .find(|port| port.name == name)
        .unwrap_or_else(|| SerialPortDescriptor::from_path(name))
}

async fn open_connection(
    connect: &ConnectArgs,
    config: &SerViewConfig,
) -> SerViewResult<(ConnectionManager, LineEnding)> {
    let baud_rate = connect.baud.unwrap_or(config.connection.baud_rate);
    let line_ending = connect
        .line_ending
        .map(LineEnding::from)
        .unwrap_or(config.connection.line_ending);

    let manager = ConnectionManager::system(&config.connection);
    let descriptor = resolve_port(&PortDiscovery::system(), &connect.port);
    manager.connect(&descriptor, baud_rate).await?;
    Ok((manager, line_ending))
}

/// Print entries appended since `printed`, returning the new high-water mark
fn flush_entries(
    manager: &ConnectionManager,
    printed: usize,
    writer: &ConsoleWriter,
    config: &SerViewConfig,
) -> SerViewResult<usize> {
    let log = manager.log();
    // A cleared log restarts numbering
    let start = if printed > log.len() { 0 } else { printed };
    let entries = log.snapshot_from(start);
    writer.write_entries(&entries, &config.display)?;
    Ok(start + entries.len())
}

async fn execute_monitor(connect: ConnectArgs, writer: &ConsoleWriter, config: &SerViewConfig) -> SerViewResult<()> {
    let (manager, line_ending) = open_connection(&connect, config).await?;
    info!("Monitoring '{}' (Ctrl+C to stop)", connect.port);

    let mut printed = 0;
    let outcome = stream_until_stopped(&manager, line_ending, writer, config, &mut printed).await;

    manager.disconnect().await?;
    flush_entries(&manager, printed, writer, config)?;
    outcome
}

async fn stream_until_stopped(
    manager: &ConnectionManager,
    line_ending: LineEnding,
    writer: &ConsoleWriter,
    config: &SerViewConfig,
    printed: &mut usize,
) -> SerViewResult<()> {
    let mut state_rx = manager.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut ticker = tokio::time::interval(config.connection.poll_interval());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!("Interrupted");
                return Ok(());
            }
            changed = state_rx.changed() => {
                if changed.is_err() || *state_rx.borrow() == ConnectionState::Disconnected {
                    let reason = manager
                        .last_fault()
                        .unwrap_or_else(|| "connection closed".to_string());
                    return Err(SerViewError::Read(io::Error::new(io::ErrorKind::BrokenPipe, reason)));
                }
            }
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => {
                    if let Err(e) = manager.send(&line, line_ending.as_str()).await {
                        writer.write_error(&e.to_string())?;
                    }
                }
                None => {
                    debug!("stdin closed; receive only");
                    stdin_open = false;
                }
            },
            _ = ticker.tick() => {}
        }
        *printed = flush_entries(manager, *printed, writer, config)?;
    }
}

async fn execute_send(
    connect: ConnectArgs,
    text: &str,
    wait_ms: u64,
    writer: &ConsoleWriter,
    config: &SerViewConfig,
) -> SerViewResult<()> {
    let (manager, line_ending) = open_connection(&connect, config).await?;

    let sent = manager.send(text, line_ending.as_str()).await;
    if sent.is_ok() {
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
    }

    manager.disconnect().await?;
    sent?;
    flush_entries(&manager, 0, writer, config)?;
    Ok(())
}

fn execute_config_command(
    args: ConfigArgs,
    writer: &ConsoleWriter,
    config: &SerViewConfig,
    config_manager: &ConfigManager,
) -> SerViewResult<()> {
    match args.command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
            Ok(())
        }
        ConfigCommand::Init { output, global } => {
            if global {
                let global_path = config_manager.global_config_path();
                config_manager.save_config_to_path(global_path, &SerViewConfig::default())?;
                writer.write_message(&format!(
                    "Global configuration initialized at '{}'",
                    global_path.display()
                ))?;
            } else {
                let dir: PathBuf = match output {
                    Some(dir) => dir.into(),
                    None => std::env::current_dir().map_err(|e| {
                        SerViewError::config(format!("Failed to get current directory: {}", e))
                    })?,
                };
                let path = config_manager.init_project_config(&dir)?;
                writer.write_message(&format!(
                    "Project configuration initialized at '{}'",
                    path.display()
                ))?;
            }
            Ok(())
        }
    }
}
