// Core module - Connection state machine and traffic log
pub mod communication;
