pub mod help;
pub mod messages;
pub mod outgoing;
pub mod ports;
pub mod status;
