//! # serlog Core Library
//!
//! Host side of a line-oriented serial logger for microcontrollers.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - A timeout-bounded serial link with byte and line reads
//! - The `0xFF` handshake that confirms the device is present
//! - The capture loop that persists data lines, shows `ECHO:` lines and
//!   stops at `DONE`
//! - Config file loading, output naming and port resolution
//!
//! ## Example
//!
//! ```rust,ignore
//! use serlog_core::prelude::*;
//!
//! let config = LoggerConfig::load("logger.yml".as_ref())?;
//! let port = resolve_port(None, config.port.as_deref(), None)?;
//! let session = config.into_session_config(port, &Overrides::default(), now)?;
//!
//! let link = open_port(&session.port, session.baud_rate, session.timeout)?;
//! let report = SessionEngine::new(session, link, ConsoleOperator::stdio())?.run()?;
//! ```

pub mod config;
pub mod link;
pub mod session;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{resolve_port, ArduinoCli, DeviceLister, LoggerConfig, Overrides};
    pub use crate::link::{open_port, Link, LinkError};
    pub use crate::session::{
        CancelToken, ConsoleOperator, Operator, SessionConfig, SessionEngine, SessionError,
        SessionReport,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
