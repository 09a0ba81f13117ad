//! Command-line arguments

use clap::{Parser, ValueEnum};
use serlog_core::config::{ArduinoCli, DeviceLister, Overrides, SerialPorts};
use serlog_core::session::HandshakePolicy;
use std::path::PathBuf;

/// Where to look for devices when resolving the port
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Discovery {
    /// arduino-cli if it is on PATH, otherwise none
    Auto,
    /// Always use arduino-cli
    ArduinoCli,
    /// Every serial port the OS reports
    Serial,
    /// No discovery; a port must be named
    Off,
}

#[derive(Parser, Debug)]
#[command(name = "serlog")]
#[command(author, version, about = "Log line-oriented serial output from a microcontroller to a file")]
pub struct Cli {
    /// Port to listen for communications on
    #[arg(short, long, env = "SERLOG_PORT")]
    pub port: Option<String>,

    /// Baud rate of the communications [default: 9600]
    #[arg(long)]
    pub baud: Option<u32>,

    /// Name of the output file [default: out]
    #[arg(long)]
    pub name: Option<String>,

    /// Timestamp the output file name (default unless the config says otherwise)
    #[arg(long, overrides_with = "no_timestamp")]
    pub timestamp: bool,

    /// Do not timestamp the output file name
    #[arg(long)]
    pub no_timestamp: bool,

    /// Communications timeout in seconds [default: 0.1]
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Echo logged data to the console
    #[arg(long)]
    pub echo: bool,

    /// Don't handshake with the device to ensure it's there
    #[arg(long)]
    pub no_handshake: bool,

    /// Count stray bytes, not just timeouts, against the handshake attempts
    #[arg(long)]
    pub strict_handshake: bool,

    /// Append to the output file instead of replacing it
    #[arg(long)]
    pub append: bool,

    /// Stop the session after this many seconds
    #[arg(long)]
    pub max_duration: Option<f64>,

    /// .json or .yaml config file with logger configuration
    #[arg(short, long, env = "SERLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Device discovery used to check or pick the port
    #[arg(long, value_enum, default_value = "auto")]
    pub discovery: Discovery,

    /// List serial ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Command-line values that override the config file
    pub fn overrides(&self) -> Overrides {
        Overrides {
            baud: self.baud,
            name: self.name.clone().filter(|n| !n.is_empty()),
            timestamp: if self.timestamp {
                Some(true)
            } else if self.no_timestamp {
                Some(false)
            } else {
                None
            },
            timeout: self.timeout,
            echo: self.echo.then_some(true),
            no_handshake: self.no_handshake.then_some(true),
            handshake_policy: self
                .strict_handshake
                .then_some(HandshakePolicy::AnyUnproductive),
            append: self.append.then_some(true),
            max_duration: self.max_duration,
        }
    }

    /// The device lister selected by `--discovery`
    pub fn lister(&self) -> Option<Box<dyn DeviceLister>> {
        match self.discovery {
            Discovery::Auto => ArduinoCli::detect().map(|c| Box::new(c) as Box<dyn DeviceLister>),
            Discovery::ArduinoCli => Some(Box::new(
                ArduinoCli::detect().unwrap_or_else(|| ArduinoCli::with_program("arduino-cli")),
            )),
            Discovery::Serial => Some(Box::new(SerialPorts)),
            Discovery::Off => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_map_to_overrides() {
        let cli = Cli::parse_from([
            "serlog",
            "--port",
            "COM3",
            "--baud",
            "115200",
            "--no-timestamp",
            "--echo",
            "--no-handshake",
            "--strict-handshake",
            "--timeout",
            "0.5",
        ]);
        assert_eq!(cli.port.as_deref(), Some("COM3"));
        assert_eq!(
            cli.overrides(),
            Overrides {
                baud: Some(115200),
                name: None,
                timestamp: Some(false),
                timeout: Some(0.5),
                echo: Some(true),
                no_handshake: Some(true),
                handshake_policy: Some(HandshakePolicy::AnyUnproductive),
                append: None,
                max_duration: None,
            }
        );
    }

    #[test]
    fn test_absent_flags_defer_to_config() {
        let cli = Cli::parse_from(["serlog", "--discovery", "off"]);
        assert_eq!(cli.overrides(), Overrides::default());
        assert!(cli.lister().is_none());
    }

    #[test]
    fn test_last_timestamp_flag_wins() {
        let cli = Cli::parse_from(["serlog", "--no-timestamp", "--timestamp"]);
        assert_eq!(cli.overrides().timestamp, Some(true));
    }
}
