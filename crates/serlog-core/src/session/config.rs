//! Session configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::SessionError;
use crate::link::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};

/// Which handshake reads count against the attempt budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandshakePolicy {
    /// Only timed-out reads count; stray bytes are discarded for free
    #[default]
    TimeoutsOnly,
    /// Timed-out reads and non-signal bytes both count
    AnyUnproductive,
}

/// How the output file is opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkMode {
    /// Create or truncate
    #[default]
    Truncate,
    /// Create or append
    Append,
}

/// Fully resolved settings for one logging session.
///
/// Built by the configuration layer, then handed to the engine which never
/// mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Serial port name
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Per-read link timeout
    pub timeout: Duration,
    /// Output file receiving data records
    pub output_path: PathBuf,
    /// Also show data records on the status stream
    pub echo: bool,
    /// Run the 0xFF handshake before capturing
    pub handshake: bool,
    /// Attempt counting rule for the handshake
    pub handshake_policy: HandshakePolicy,
    /// Output file open mode
    pub sink_mode: SinkMode,
    /// Upper bound on the whole session, if any
    pub max_duration: Option<Duration>,
}

impl SessionConfig {
    /// Create a config with default link settings
    pub fn new(port: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
            output_path: output_path.into(),
            echo: false,
            handshake: true,
            handshake_policy: HandshakePolicy::default(),
            sink_mode: SinkMode::default(),
            max_duration: None,
        }
    }

    /// Check the values the engine depends on
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.baud_rate == 0 {
            return Err(SessionError::InvalidConfig(
                "baud rate must be positive".into(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(SessionError::InvalidConfig("timeout must be positive".into()));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(SessionError::InvalidConfig("output path is empty".into()));
        }
        if self.max_duration.is_some_and(|d| d.is_zero()) {
            return Err(SessionError::InvalidConfig(
                "session duration limit must be positive".into(),
            ));
        }
        Ok(())
    }
}
