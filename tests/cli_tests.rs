use std::fs;
use std::process::{Command, Output};
use std::str;
use tempfile::TempDir;

fn serview(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_serview"))
        .args(args)
        .output()
        .expect("Failed to execute serview")
}

/// CLI interface tests
#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_cli_help() {
        let output = serview(&["--help"]);
        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");

        assert!(output.status.success());
        assert!(stdout.contains("Usage:"));
        assert!(stdout.contains("Commands:"));
        for command in ["tui", "list", "monitor", "send", "config", "version"] {
            assert!(stdout.contains(command), "help is missing '{}'", command);
        }
    }

    #[test]
    fn test_cli_version() {
        let output = serview(&["-q", "version"]);
        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");

        assert!(output.status.success());
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_config_show_json_with_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("serview.toml");
        fs::write(&path, "[connection]\nbaud_rate = 9600\nline_ending = \"crlf\"\n").unwrap();

        let output = serview(&["-q", "-o", "json", "-c", path.to_str().unwrap(), "config", "show"]);
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["connection"]["baud_rate"], 9600);
        assert_eq!(value["connection"]["line_ending"], "crlf");
        assert_eq!(value["display"]["incoming_prefix"], ">>>");
    }

    #[test]
    fn test_invalid_config_exits_with_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[connection]\ndata_bits = 9\n").unwrap();

        let output = serview(&["-q", "-c", path.to_str().unwrap(), "config", "show"]);
        let stderr = str::from_utf8(&output.stderr).expect("Invalid UTF-8");

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr.contains("Invalid data bits"));
    }

    #[test]
    fn test_config_init_writes_project_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();

        let output = serview(&["-q", "config", "init", "--output", dir]);
        assert!(output.status.success());

        let written = temp_dir.path().join(".serview").join("config.toml");
        let content = fs::read_to_string(written).unwrap();
        assert!(content.contains("baud_rate = 115200"));

        // A second init refuses to overwrite
        let output = serview(&["-q", "config", "init", "--output", dir]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_monitor_requires_port() {
        let output = serview(&["monitor"]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_send_to_missing_device_fails_cleanly() {
        let output = serview(&["-q", "send", "/dev/serview-does-not-exist", "AT"]);
        let stderr = str::from_utf8(&output.stderr).expect("Invalid UTF-8");

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr.contains("Failed to open device '/dev/serview-does-not-exist'"));
    }
}
