//! Logger configuration file
//!
//! JSON or YAML, every key optional:
//!
//! ```yaml
//! port: /dev/ttyACM0
//! baud: 115200
//! name: bench-run
//! timestamp: true
//! timeout: 0.5
//! echo: false
//! no_handshake: false
//! handshake_policy: timeouts-only
//! append: false
//! max_duration: 3600
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::{output_path, ConfigError};
use crate::link::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};
use crate::session::{HandshakePolicy, SessionConfig, SinkMode};

/// Default output base name
pub const DEFAULT_NAME: &str = "out";

/// Timestamped output names when no config file is loaded
pub const DEFAULT_TIMESTAMP: bool = true;

/// Settings read from a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Serial port name
    pub port: Option<String>,
    /// Baud rate
    pub baud: Option<u32>,
    /// Output file name
    pub name: Option<String>,
    /// Insert a timestamp into the output file name
    pub timestamp: Option<bool>,
    /// Link timeout in seconds
    pub timeout: Option<f64>,
    /// Show data records on the console
    pub echo: Option<bool>,
    /// Skip the handshake
    pub no_handshake: Option<bool>,
    /// Handshake attempt counting
    pub handshake_policy: Option<HandshakePolicy>,
    /// Append to the output file instead of truncating
    pub append: Option<bool>,
    /// Whole-session limit in seconds
    pub max_duration: Option<f64>,
}

/// Values given on the command line; each wins over the config file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Baud rate
    pub baud: Option<u32>,
    /// Output file name
    pub name: Option<String>,
    /// Timestamp on or off
    pub timestamp: Option<bool>,
    /// Link timeout in seconds
    pub timeout: Option<f64>,
    /// Show data records on the console
    pub echo: Option<bool>,
    /// Skip the handshake
    pub no_handshake: Option<bool>,
    /// Handshake attempt counting
    pub handshake_policy: Option<HandshakePolicy>,
    /// Append instead of truncate
    pub append: Option<bool>,
    /// Whole-session limit in seconds
    pub max_duration: Option<f64>,
}

impl LoggerConfig {
    /// Load a `.json`, `.yml` or `.yaml` config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotAFile(path.to_path_buf()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        let config: LoggerConfig = match ext.as_deref() {
            Some("json") => serde_json::from_str(&fs::read_to_string(path)?)?,
            Some("yml") | Some("yaml") => serde_yaml::from_str(&fs::read_to_string(path)?)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        let mut config = config.normalized();
        // A config file without the key means no timestamp
        config.timestamp.get_or_insert(false);
        tracing::debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Treat empty strings as absent
    pub fn normalized(mut self) -> Self {
        if self.port.as_deref() == Some("") {
            self.port = None;
        }
        if self.name.as_deref() == Some("") {
            self.name = None;
        }
        self
    }

    /// Merge command-line overrides and defaults into a session config.
    ///
    /// `now` is used for the output file timestamp.
    pub fn into_session_config(
        self,
        port: String,
        overrides: &Overrides,
        now: NaiveDateTime,
    ) -> Result<SessionConfig, ConfigError> {
        let name = overrides
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .or(self.name)
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let timestamp = overrides
            .timestamp
            .or(self.timestamp)
            .unwrap_or(DEFAULT_TIMESTAMP);

        let baud_rate = overrides.baud.or(self.baud).unwrap_or(DEFAULT_BAUD_RATE);
        if baud_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "baud",
                reason: "must be positive".into(),
            });
        }

        let timeout = match overrides.timeout.or(self.timeout) {
            Some(secs) => seconds("timeout", secs)?,
            None => DEFAULT_TIMEOUT,
        };
        let max_duration = overrides
            .max_duration
            .or(self.max_duration)
            .map(|secs| seconds("max_duration", secs))
            .transpose()?;

        let append = overrides.append.or(self.append).unwrap_or(false);

        Ok(SessionConfig {
            port,
            baud_rate,
            timeout,
            output_path: output_path(&name, timestamp.then_some(&now)),
            echo: overrides.echo.or(self.echo).unwrap_or(false),
            handshake: !overrides
                .no_handshake
                .or(self.no_handshake)
                .unwrap_or(false),
            handshake_policy: overrides
                .handshake_policy
                .or(self.handshake_policy)
                .unwrap_or_default(),
            sink_mode: if append {
                SinkMode::Append
            } else {
                SinkMode::Truncate
            },
            max_duration,
        })
    }
}

/// Positive, finite seconds as a duration
fn seconds(field: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a positive number of seconds, got {}", secs),
        });
    }
    Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })
}
