//! Configuration
//!
//! Everything that happens before a session exists: reading the config file,
//! merging command-line overrides, naming the output file and picking the
//! port. The result is a [`SessionConfig`](crate::session::SessionConfig).

mod file;
mod naming;
pub mod resolve;

pub use file::{LoggerConfig, Overrides, DEFAULT_NAME, DEFAULT_TIMESTAMP};
pub use naming::{output_path, DEFAULT_EXTENSION, TIMESTAMP_FORMAT};
pub use resolve::{
    parse_board_list, resolve_port, ArduinoCli, DeviceLister, ResolutionError, SerialPorts,
};

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or merging configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Path missing or not a regular file
    #[error("Config path '{}' is not a file", .0.display())]
    NotAFile(PathBuf),

    /// Extension other than json, yml or yaml
    #[error("Only JSON and YAML config files are supported, got '{}'", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Reading the file failed
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML
    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value out of range
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Offending key
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}
