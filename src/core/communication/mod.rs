// Communication module - Connection lifecycle, read loop and message log
pub mod connection;
pub mod message;
pub mod reader;
pub mod task;

pub use connection::{Action, ConnectionManager, ConnectionSettings, ConnectionState};
pub use message::{LogEntry, MessageDirection, MessageLog};
pub use reader::{ReadLoop, ReadLoopExit, SharedHandle};
pub use task::{CancelSignal, CancellableTask};
