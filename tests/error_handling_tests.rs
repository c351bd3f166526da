use serview::{SerViewError, SerViewResult};
use std::error::Error;

/// Error handling tests
#[cfg(test)]
mod error_handling_tests {
    use super::*;

    fn open_error() -> SerViewError {
        SerViewError::DeviceOpen {
            port: "/dev/ttyUSB0".to_string(),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "no such device"),
        }
    }

    #[test]
    fn test_error_types() {
        let errors = vec![
            open_error(),
            SerViewError::AlreadyConnected { port: "COM3".to_string() },
            SerViewError::NotConnected,
            SerViewError::Write(std::io::Error::new(std::io::ErrorKind::TimedOut, "write timed out")),
            SerViewError::Read(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged")),
            SerViewError::CancellationTimeout { timeout_ms: 2000 },
            SerViewError::TaskFailed("panicked".to_string()),
            SerViewError::Config { message: "Config error".to_string() },
            SerViewError::InvalidInput("Invalid input".to_string()),
            SerViewError::Tui("TUI error".to_string()),
            SerViewError::Output("Output error".to_string()),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty(), "Error display should not be empty");
        }

        // Errors cross task boundaries
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SerViewError>();
    }

    #[test]
    fn test_device_open_names_port_and_keeps_source() {
        let error = open_error();
        let display = error.to_string();
        assert!(display.contains("/dev/ttyUSB0"));
        assert!(display.contains("no such device"));

        let source = error.source().expect("serialport error kept as source");
        assert!(source.to_string().contains("no such device"));
    }

    #[test]
    fn test_io_error_conversion() {
        fn read_missing() -> SerViewResult<String> {
            Ok(std::fs::read_to_string("/nonexistent/serview/file")?)
        }

        let error = read_missing().unwrap_err();
        assert!(matches!(error, SerViewError::Io(_)));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_cancellation_timeout_message() {
        let error = SerViewError::CancellationTimeout { timeout_ms: 50 };
        assert!(error.to_string().contains("50ms"));
    }

    #[tokio::test]
    async fn test_async_error_propagation() {
        async fn failing() -> SerViewResult<()> {
            Err(SerViewError::NotConnected)
        }

        async fn calling() -> SerViewResult<()> {
            failing().await?;
            Ok(())
        }

        let error = calling().await.unwrap_err();
        assert!(matches!(error, SerViewError::NotConnected));
        assert_eq!(error.to_string(), "Device not connected");
    }

    #[test]
    fn test_error_size() {
        let error_size = std::mem::size_of::<SerViewError>();
        assert!(error_size <= 128, "SerViewError too large: {} bytes", error_size);
    }
}
