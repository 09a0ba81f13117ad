//! Session errors

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::record::DecodeError;
use crate::link::LinkError;

/// Why a session stopped before the terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The cancel token was triggered (e.g. Ctrl-C)
    Interrupted,
    /// The session ran past its duration limit
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Interrupted => write!(f, "interrupted"),
            CancelReason::DeadlineExceeded => write!(f, "duration limit reached"),
        }
    }
}

/// Terminal failures of a logging session.
///
/// Every variant ends the session; nothing is retried or resumed.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Config rejected before the session starts
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),

    /// No handshake signal within the attempt budget
    #[error("Handshake failed: no signal after {attempts} attempts")]
    HandshakeFailed {
        /// Attempts used
        attempts: u32,
    },

    /// The link failed
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// A received line was not ASCII
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The output file could not be opened
    #[error("Failed to open output file '{}': {source}", .path.display())]
    SinkOpen {
        /// Output file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Writing or flushing the output failed
    #[error("Failed to write output file: {0}")]
    Sink(#[source] io::Error),

    /// Console input or output failed
    #[error("Operator I/O failed: {0}")]
    Operator(#[source] io::Error),

    /// Stopped by the cancel token or the duration limit
    #[error("Session cancelled: {0}")]
    Cancelled(CancelReason),
}

impl SessionError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionError::InvalidConfig(_) => 2,
            SessionError::HandshakeFailed { .. } => 3,
            SessionError::Link(_) => 4,
            SessionError::Decode(_) => 5,
            SessionError::SinkOpen { .. } | SessionError::Sink(_) => 6,
            SessionError::Operator(_) => 7,
            SessionError::Cancelled(_) => 130,
        }
    }

    /// Remediation hint for the operator, if one applies
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SessionError::HandshakeFailed { .. } => Some("did you name a valid port?"),
            SessionError::Link(LinkError::Disconnected) => Some("is the device still plugged in?"),
            SessionError::Decode(_) => Some("check that the baud rate matches the device"),
            _ => None,
        }
    }
}
