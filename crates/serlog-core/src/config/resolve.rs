//! Port resolution
//!
//! Picks the port to log from: an explicit command-line value, then the
//! config file, then the single board a device-listing tool reports.

use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

use crate::link::list_ports;

/// Name of the Arduino command-line tool
pub const ARDUINO_CLI: &str = "arduino-cli";

/// Failures to settle on a single port
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Nothing named a port and no lister is available
    #[error("No port specified and arduino-cli not found; name a port on the command line or in the config")]
    NoPort,

    /// The lister found nothing
    #[error("No devices found")]
    NoDevices,

    /// More than one candidate and none named
    #[error("There are multiple valid devices ({}); specify one in the config or on the command line", .0.join(", "))]
    Ambiguous(Vec<String>),

    /// The named port is not among the listed devices
    #[error("Specified port '{0}' does not name a valid device")]
    NotADevice(String),

    /// The lister itself failed
    #[error("Device listing failed: {0}")]
    ListingFailed(String),
}

/// Source of candidate device ports
pub trait DeviceLister {
    /// Candidate port names
    fn list(&self) -> Result<Vec<String>, ResolutionError>;
}

/// Lists boards via `arduino-cli board list`
#[derive(Debug, Clone)]
pub struct ArduinoCli {
    program: PathBuf,
}

impl ArduinoCli {
    /// Locate `arduino-cli` on `PATH`
    pub fn detect() -> Option<Self> {
        let path = std::env::var_os("PATH")?;
        let names: &[&str] = if cfg!(windows) {
            &["arduino-cli.exe", ARDUINO_CLI]
        } else {
            &[ARDUINO_CLI]
        };
        std::env::split_paths(&path)
            .flat_map(|dir| names.iter().map(move |n| dir.join(n)))
            .find(|candidate| candidate.is_file())
            .map(Self::with_program)
    }

    /// Use a specific `arduino-cli` binary
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DeviceLister for ArduinoCli {
    fn list(&self) -> Result<Vec<String>, ResolutionError> {
        let output = Command::new(&self.program)
            .args(["board", "list"])
            .output()
            .map_err(|e| ResolutionError::ListingFailed(e.to_string()))?;
        if !output.status.success() {
            return Err(ResolutionError::ListingFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let ports = parse_board_list(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!("{} reported {:?}", ARDUINO_CLI, ports);
        Ok(ports)
    }
}

/// Lists every serial port the OS enumerates
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPorts;

impl DeviceLister for SerialPorts {
    fn list(&self) -> Result<Vec<String>, ResolutionError> {
        Ok(list_ports().into_iter().map(|p| p.name).collect())
    }
}

/// Extract ports from `arduino-cli board list` output.
///
/// Skips the header row, blank rows and boards the tool could not identify.
pub fn parse_board_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.ends_with("Unknown"))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Decide which port to open.
///
/// A named port is checked against the lister when one is available.
/// Without a named port the lister must report exactly one device.
pub fn resolve_port(
    explicit: Option<&str>,
    configured: Option<&str>,
    lister: Option<&dyn DeviceLister>,
) -> Result<String, ResolutionError> {
    let named = explicit
        .filter(|p| !p.is_empty())
        .or(configured.filter(|p| !p.is_empty()));

    match (named, lister) {
        (Some(port), Some(lister)) => {
            if lister.list()?.iter().any(|d| d == port) {
                Ok(port.to_string())
            } else {
                Err(ResolutionError::NotADevice(port.to_string()))
            }
        }
        (Some(port), None) => Ok(port.to_string()),
        (None, Some(lister)) => {
            let mut devices = lister.list()?;
            match devices.len() {
                0 => Err(ResolutionError::NoDevices),
                1 => Ok(devices.remove(0)),
                _ => Err(ResolutionError::Ambiguous(devices)),
            }
        }
        (None, None) => Err(ResolutionError::NoPort),
    }
}
