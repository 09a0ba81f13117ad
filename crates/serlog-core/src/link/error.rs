//! Link errors

use thiserror::Error;

/// Errors that can occur on the physical link
#[derive(Error, Debug)]
pub enum LinkError {
    /// The port could not be opened
    #[error("Failed to open port '{port}': {reason}")]
    OpenFailed {
        /// Port name as given
        port: String,
        /// Driver message
        reason: String,
    },

    /// Error reported by the serial driver
    #[error("Serial port error: {0}")]
    SerialError(String),

    /// Baud rate or timeout rejected before opening
    #[error("Invalid link setting: {0}")]
    InvalidSetting(String),

    /// The device went away
    #[error("Device disconnected")]
    Disconnected,

    /// No line terminator within the buffer limit
    #[error("No line terminator after {len} bytes (limit {limit})")]
    LineTooLong {
        /// Bytes buffered without a terminator
        len: usize,
        /// Buffer limit
        limit: usize,
    },

    /// Any other I/O failure
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serialport::Error> for LinkError {
    fn from(e: serialport::Error) -> Self {
        LinkError::SerialError(e.to_string())
    }
}
